//! Route patterns and their reversal into concrete paths.
//!
//! Route names follow the `app:view` form, e.g. `users:staff_permission`.
//! Usernames are percent-encoded when substituted, so the result is always a
//! valid `Location` value.

/// `home`
pub const HOME: &str = "/";
/// `users:list`
pub const USER_LIST: &str = "/users/";
/// `users:redirect`
pub const USER_REDIRECT: &str = "/users/~redirect/";
/// `users:update`
pub const USER_UPDATE: &str = "/users/~update/";
/// `users:detail`
pub const USER_DETAIL: &str = "/users/{username}/";
/// `users:staff_permission`
pub const STAFF_PERMISSION: &str = "/users/{username}/permission/";
/// `filesupload:files_upload`
pub const FILES_UPLOAD: &str = "/documents/upload";

pub fn home() -> String {
    HOME.to_string()
}

pub fn user_list() -> String {
    USER_LIST.to_string()
}

pub fn user_update() -> String {
    USER_UPDATE.to_string()
}

pub fn user_detail(username: &str) -> String {
    USER_DETAIL.replace("{username}", &urlencoding::encode(username))
}

pub fn staff_permission(username: &str) -> String {
    STAFF_PERMISSION.replace("{username}", &urlencoding::encode(username))
}

pub fn files_upload() -> String {
    FILES_UPLOAD.to_string()
}
