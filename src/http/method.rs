//! Request verbs supported by the harness

use std::fmt;
use std::str::FromStr;

use crate::common::Error;

/// The fixed set of request categories a test may issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    /// Sent as `PUT`
    PutOrPatch,
    Delete,
}

impl Method {
    /// Name used in log lines
    pub fn name(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::PutOrPatch => "PUT_OR_PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Wire verb
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::PutOrPatch => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" | "PATCH" | "PUT_OR_PATCH" => Ok(Method::PutOrPatch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::UnsupportedMethod(s.to_string())),
        }
    }
}
