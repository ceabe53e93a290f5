//! Diesel ORM records for database tables.

use diesel::prelude::*;

use super::util::parse_datetime;
use crate::models::{BadUrl, Credential, Feedback, Website};
use crate::schema;

/// Website record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::websites)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WebsiteRecord {
    pub id: i32,
    pub name: String,
    pub domain: String,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::websites)]
pub struct NewWebsiteRecord<'a> {
    pub name: &'a str,
    pub domain: &'a str,
    pub created_at: &'a str,
}

impl From<WebsiteRecord> for Website {
    fn from(r: WebsiteRecord) -> Self {
        Website {
            id: r.id,
            name: r.name,
            domain: r.domain,
            created_at: parse_datetime(&r.created_at),
        }
    }
}

/// Credential record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::credentials)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CredentialRecord {
    pub id: i32,
    pub appkey: String,
    pub appsecret: String,
    pub description: String,
    pub website_id: i32,
    pub frequency_limit: i32,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::credentials)]
pub struct NewCredentialRecord<'a> {
    pub appkey: &'a str,
    pub appsecret: &'a str,
    pub description: &'a str,
    pub website_id: i32,
    pub frequency_limit: i32,
    pub created_at: &'a str,
}

impl From<CredentialRecord> for Credential {
    fn from(r: CredentialRecord) -> Self {
        Credential {
            id: r.id,
            appkey: r.appkey,
            appsecret: r.appsecret,
            description: r.description,
            website_id: r.website_id,
            frequency_limit: r.frequency_limit,
            created_at: parse_datetime(&r.created_at),
        }
    }
}

/// Feedback record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::feedback)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FeedbackRecord {
    pub id: i32,
    pub email: String,
    pub content: String,
    pub ip: Option<String>,
    pub checked: bool,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::feedback)]
pub struct NewFeedbackRecord<'a> {
    pub email: &'a str,
    pub content: &'a str,
    pub ip: Option<&'a str>,
    pub checked: bool,
    pub created_at: &'a str,
}

impl From<FeedbackRecord> for Feedback {
    fn from(r: FeedbackRecord) -> Self {
        Feedback {
            id: r.id,
            email: r.email,
            content: r.content,
            ip: r.ip,
            checked: r.checked,
            created_at: parse_datetime(&r.created_at),
        }
    }
}

/// Bad-URL report record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::bad_urls)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BadUrlRecord {
    pub id: i32,
    pub url: String,
    pub reason: String,
    pub ip: Option<String>,
    pub checked: bool,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::bad_urls)]
pub struct NewBadUrlRecord<'a> {
    pub url: &'a str,
    pub reason: &'a str,
    pub ip: Option<&'a str>,
    pub checked: bool,
    pub created_at: &'a str,
}

impl From<BadUrlRecord> for BadUrl {
    fn from(r: BadUrlRecord) -> Self {
        BadUrl {
            id: r.id,
            url: r.url,
            reason: r.reason,
            ip: r.ip,
            checked: r.checked,
            created_at: parse_datetime(&r.created_at),
        }
    }
}
