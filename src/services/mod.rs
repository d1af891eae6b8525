pub mod content_service;
pub mod object_service;
pub mod s3_backend;
