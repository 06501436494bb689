use bstr::ByteSlice;
use git_validate::{reference, tree};

#[test]
fn head_and_standard_branches_are_valid_references() {
    assert!(reference::name("HEAD".as_bytes().as_bstr()).is_ok());
    assert!(reference::name("refs/heads/main".as_bytes().as_bstr()).is_ok());
}

#[test]
fn lowercase_standalone_names_are_rejected() {
    assert!(reference::name("head".as_bytes().as_bstr()).is_err());
}

#[test]
fn repeated_or_leading_slashes_are_rejected() {
    assert!(reference::name("refs//heads/main".as_bytes().as_bstr()).is_err());
    assert!(reference::name("/refs/heads/main".as_bytes().as_bstr()).is_err());
}

#[test]
fn tree_entry_names_reject_traversal_and_separators() {
    assert!(tree::name("src".as_bytes().as_bstr()).is_ok());
    assert!(tree::name("..".as_bytes().as_bstr()).is_err());
    assert!(tree::name(".git".as_bytes().as_bstr()).is_err());
    assert!(tree::name("a/b".as_bytes().as_bstr()).is_err());
    assert!(tree::name("".as_bytes().as_bstr()).is_err());
}
