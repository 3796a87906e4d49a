use vaultlens_core::detect::{self, value_span, BLOB_REGION_ID};
use vaultlens_core::{Boundary, Container, Document, EncryptedPayload, RegionKind};

const VAULT_FILE: &str = "\
$ANSIBLE_VAULT;1.1;AES256
62313365396662343061393464336163383764373764613633653634306231386433626436623361
6165
";

#[test]
fn blob_region_covers_the_whole_body() {
    let doc = Document::from_blob("host_vars/web.yml", VAULT_FILE);
    let regions = detect::detect(&doc);
    assert_eq!(regions.len(), 1);

    let region = &regions[0];
    assert_eq!(region.id(), BLOB_REGION_ID);
    assert_eq!(region.kind(), RegionKind::Blob);
    assert_eq!(region.container(), &Container::Body);
    assert_eq!(region.boundary(), Boundary::new(0, 3));
    assert_eq!(
        region.payload(),
        &EncryptedPayload::Blob {
            ciphertext: "623133653966623430613934643361633837643737646136336536343062313864336264366233616165".into()
        }
    );
}

#[test]
fn vault_file_with_yaml_extension_is_not_a_yaml_region() {
    let doc = Document::from_blob("vars.yml", VAULT_FILE);
    let kinds: Vec<RegionKind> = detect::detect(&doc).iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec![RegionKind::Blob]);
}

#[test]
fn plain_documents_have_no_regions() {
    let doc = Document::from_blob("README.md", "# Vaults\n\nUse `!vault` tags.\n");
    assert!(detect::detect(&doc).is_empty());

    let doc = Document::from_unified_diff(
        "--- a/README.md\n+++ b/README.md\n@@ -1 +1 @@\n-old\n+new\n",
    );
    assert!(detect::detect(&doc).is_empty());
}

#[test]
fn diff_and_yaml_regions_are_reported_per_mode() {
    let diff = Document::from_unified_diff(
        "\
diff --git a/a.yml b/a.yml
--- a/a.yml
+++ b/a.yml
@@ -1,2 +1,2 @@
 $ANSIBLE_VAULT;1.1;AES256
-aa
+bb
diff --git a/b.yml b/b.yml
--- a/b.yml
+++ b/b.yml
@@ -1,2 +1,2 @@
 $ANSIBLE_VAULT;1.1;AES256
-cc
+dd
",
    );
    let ids: Vec<String> = detect::detect_diff(&diff)
        .iter()
        .map(|region| region.id().to_owned())
        .collect();
    assert_eq!(ids, vec!["diff-a-yml", "diff-b-yml"]);
    assert!(detect::detect_blob(&diff).is_none());
    assert!(detect::detect_yaml(&diff).is_empty());

    let yaml = Document::from_blob(
        "vars.yml",
        "token: !vault |\n  $ANSIBLE_VAULT;1.1;AES256\n  abcd\n",
    );
    let regions = detect::detect_yaml(&yaml);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].boundary(), Boundary::new(1, 3));
    assert_eq!(regions[0].original().span(), Boundary::new(0, 3));
}

#[test]
fn yaml_marker_on_last_line_is_ignored() {
    let doc = Document::from_blob("vars.yml", "a: 1\nsecret: !vault |\n");
    assert!(detect::detect(&doc).is_empty());
}

#[test]
fn value_span_matches_documented_example() {
    let lines = ["key: !vault", "  AES1", "  AES2", "next: x"];
    assert_eq!(value_span(&lines, 0), Some(1..3));
}

#[test]
fn decorated_regions_are_skipped() {
    let mut doc = Document::from_blob("vars.yml", VAULT_FILE);
    doc.install_controls(BLOB_REGION_ID);
    assert!(detect::detect(&doc).is_empty());
}
