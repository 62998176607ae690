pub mod guide;
pub mod health_route;
