pub mod assistant_service;
pub mod itinerary_service;
pub mod places_service;
pub mod polling;
pub mod reply_parser;
