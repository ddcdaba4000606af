// Service module exports

pub mod countdown;
pub mod redirect;
pub mod settings;
