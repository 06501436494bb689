use git_actor::Signature;

#[test]
fn parses_name_email_and_time() {
    let sig = Signature::from_bytes(b"Sibling Author <author@example.com> 1112911993 -0700").unwrap();
    assert_eq!(sig.name, "Sibling Author");
    assert_eq!(sig.email, "author@example.com");
    assert_eq!(sig.time.seconds_since_unix_epoch, 1_112_911_993);
    assert_eq!(sig.time.offset_in_seconds, -25200);
}

#[test]
fn write_to_round_trips() {
    let sig = Signature::from_bytes(b"A U Thor <author@example.com> 1112911993 +0230").unwrap();
    let mut buf = Vec::new();
    sig.write_to(&mut buf).unwrap();
    assert_eq!(buf, b"A U Thor <author@example.com> 1112911993 +0230");
}

#[test]
fn rejects_missing_email_brackets() {
    assert!(Signature::from_bytes(b"A U Thor author@example.com 1112911993 +0230").is_err());
}
