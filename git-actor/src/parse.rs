use bstr::{BStr, ByteSlice};
use nom::{
    bytes::complete::{tag, take_until},
    IResult,
};
use quick_error::quick_error;

use git_date::Time;

quick_error! {
    /// The error returned when a `name <email> time` line is malformed.
    #[derive(Debug)]
    #[allow(missing_docs)]
    pub enum Error {
        Nom(message: String) {
            display("{}", message)
        }
        Time(err: git_date::parse::Error) {
            display("Could not parse the trailing time")
            from()
            source(err)
        }
    }
}

/// Parse the `Name <email> <seconds> <+HHMM>` line shared by author, committer and tagger
/// entries, returning the name and email still borrowed from `input`.
pub fn signature(input: &BStr) -> Result<(&BStr, &BStr, Time), Error> {
    let (name, email, time_bytes) = parse(input.as_bytes()).map_err(|err| Error::Nom(err.to_string()))?.1;
    let time = git_date::parse::time(time_bytes.as_bstr())?;
    Ok((name.as_bstr(), email.as_bstr(), time))
}

fn parse(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8], &[u8])> {
    let (rest, name) = take_until(" <")(input)?;
    let (rest, _) = tag(" <")(rest)?;
    let (rest, email) = take_until("> ")(rest)?;
    let (rest, _) = tag("> ")(rest)?;
    Ok((&rest[rest.len()..], (name, email, rest)))
}
