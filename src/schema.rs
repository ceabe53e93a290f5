// Diesel table definitions. Kept in sync with `DbContext::init_schema`.

diesel::table! {
    websites (id) {
        id -> Integer,
        name -> Text,
        domain -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    credentials (id) {
        id -> Integer,
        appkey -> Text,
        appsecret -> Text,
        description -> Text,
        website_id -> Integer,
        frequency_limit -> Integer,
        created_at -> Text,
    }
}

diesel::table! {
    feedback (id) {
        id -> Integer,
        email -> Text,
        content -> Text,
        ip -> Nullable<Text>,
        checked -> Bool,
        created_at -> Text,
    }
}

diesel::table! {
    bad_urls (id) {
        id -> Integer,
        url -> Text,
        reason -> Text,
        ip -> Nullable<Text>,
        checked -> Bool,
        created_at -> Text,
    }
}

diesel::joinable!(credentials -> websites (website_id));

diesel::allow_tables_to_appear_in_same_query!(bad_urls, credentials, feedback, websites,);
