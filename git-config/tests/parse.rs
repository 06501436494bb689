use git_config::Config;

const SAMPLE: &[u8] = br#"
[core]
	bare = false
	filemode = true
	; a comment
	autocrlf = input
	bigFileThreshold = 4g
[user]
	name = Jane Doe
	email = jane@example.com
[remote "origin"]
	url = "https://example.com/repo.git"
	fetch = "+refs/heads/*:refs/remotes/origin/*"
[extensions]
	objectFormat = sha256
"#;

#[test]
fn reads_scalar_values_case_insensitively() {
    let config = Config::from_bytes(SAMPLE).unwrap();
    assert_eq!(config.raw("core", "bare").unwrap(), "false");
    assert_eq!(config.raw("CORE", "BARE").unwrap(), "false");
    assert_eq!(config.boolean("core", "filemode").unwrap(), Some(true));
}

#[test]
fn autocrlf_input_is_not_a_plain_boolean() {
    let config = Config::from_bytes(SAMPLE).unwrap();
    assert!(config.boolean("core", "autocrlf").is_err());
}

#[test]
fn integer_suffix_is_applied() {
    let config = Config::from_bytes(SAMPLE).unwrap();
    assert_eq!(config.integer("core", "bigfilethreshold").unwrap(), Some(4 * 1024 * 1024 * 1024));
}

#[test]
fn subsection_values_are_looked_up_by_name() {
    let config = Config::from_bytes(SAMPLE).unwrap();
    assert_eq!(
        config.raw_subsection("remote", Some("origin"), "url").unwrap(),
        "https://example.com/repo.git"
    );
}

#[test]
fn user_identity_reads_both_fields() {
    let config = Config::from_bytes(SAMPLE).unwrap();
    let identity = config.user_identity().unwrap();
    assert_eq!(identity.name, "Jane Doe");
    assert_eq!(identity.email, "jane@example.com");
}

#[test]
fn object_format_defaults_to_sha1_when_unset() {
    let config = Config::from_bytes(b"[core]\n\tbare = false\n").unwrap();
    assert_eq!(config.object_format().unwrap(), git_hash::Kind::Sha1);
}

#[test]
fn object_format_reads_sha256_extension() {
    let config = Config::from_bytes(SAMPLE).unwrap();
    assert_eq!(config.object_format().unwrap(), git_hash::Kind::Sha256);
}

#[test]
fn core_settings_fills_in_documented_defaults() {
    let config = Config::from_bytes(b"[core]\n\tbare = true\n").unwrap();
    let settings = config.core_settings().unwrap();
    assert!(settings.bare);
    assert!(settings.filemode);
    assert!(settings.logallrefupdates);
    assert_eq!(settings.big_file_threshold, 512 * 1024 * 1024);
}

#[test]
fn last_occurrence_of_a_repeated_key_wins() {
    let config = Config::from_bytes(b"[core]\n\tbare = true\n\tbare = false\n").unwrap();
    assert_eq!(config.boolean("core", "bare").unwrap(), Some(false));
}

#[test]
fn rejects_an_entry_outside_any_section() {
    assert!(Config::from_bytes(b"bare = true\n").is_err());
}
