//! Request signing helper for API clients.

use console::style;

use crate::auth::signing::sign;

pub fn cmd_sign(timestamp: i64, token: &str, appkey: &str) {
    let signature = sign(timestamp, token, appkey);
    println!("{}", signature);
    eprintln!(
        "{} query: _={}&appkey={}&token={}&sign={}",
        style("→").cyan(),
        timestamp,
        appkey,
        token,
        signature
    );
}
