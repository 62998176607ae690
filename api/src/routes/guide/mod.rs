pub mod guide_request;
pub mod guide_route;
