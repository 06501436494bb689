use bstr::ByteSlice;
use git_date::{parse, SignKind, Time};

#[test]
fn round_trips_through_write_to() {
    let time = Time::new(1_112_911_993, -25200);
    assert_eq!(time.to_bstring(), "1112911993 -0700");
    let parsed = parse::time("1112911993 -0700".as_bytes().as_bstr()).unwrap();
    assert_eq!(parsed, time);
}

#[test]
fn zero_offset_preserves_explicit_sign() {
    let parsed = parse::time("1112911993 -0000".as_bytes().as_bstr()).unwrap();
    assert_eq!(parsed.sign, SignKind::Minus);
    assert_eq!(parsed.offset_in_seconds, 0);
}

#[test]
fn rejects_malformed_offset() {
    assert!(parse::time("1112911993 0700".as_bytes().as_bstr()).is_err());
    assert!(parse::time("notanumber -0700".as_bytes().as_bstr()).is_err());
}
