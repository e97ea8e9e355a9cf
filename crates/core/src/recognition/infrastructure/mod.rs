pub mod rest_provider;
