mod client;

pub use client::HttpTicketApi;
