//! Command-line front end for audiofeat

pub mod output;
