use super::*;

#[test]
fn config_dir_ends_with_app_name() {
    let dir = get_config_dir().expect("config dir should resolve");
    assert!(dir.ends_with("docs-agent"));
}
