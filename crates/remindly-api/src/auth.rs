/// Header carrying the session token on every authenticated call.
pub const AUTH_HEADER: &str = "X-Remind-Auth-Token";
