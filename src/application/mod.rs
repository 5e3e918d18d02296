pub mod catalog_service;
pub mod sessions;
pub mod shop_service;
pub mod venue_service;
