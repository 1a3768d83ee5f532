pub mod manual_provider;
