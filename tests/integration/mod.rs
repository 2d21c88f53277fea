mod scenarios;
mod sled_service;
