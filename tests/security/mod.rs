mod permission;
mod server;
