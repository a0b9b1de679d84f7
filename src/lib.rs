#![forbid(unsafe_code)]

pub mod assemble;
pub mod batch;
pub mod bible_books;
pub mod book_then_lang;
pub mod bundle;
pub mod cli;
pub mod dispatch;
pub mod document;
pub mod fragments;
pub mod headings;
pub mod lang_then_book;
pub mod links;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod request;
pub mod tw;
