mod docs;
mod health;
pub mod images;
pub mod reviews;
pub mod roasts;
pub mod users;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware;

use crate::{
    middleware::{api_key_middleware, auth_middleware},
    types::Environment,
};

/// Creates the router with all handler routes
pub fn handler(environment: &Environment) -> ApiRouter {
    let public_routes = ApiRouter::new()
        .api_route("/", get(health::handler))
        .api_route("/roasts", get(roasts::get_all_roasts))
        .api_route("/reviews/{roastID}", get(reviews::get_reviews))
        .api_route("/userReviews/{userID}", get(users::get_user_reviews));

    let admin_routes = ApiRouter::new()
        .api_route("/roast", post(roasts::create_roast))
        .api_route("/deleteRoast", post(roasts::delete_roast))
        .layer(middleware::from_fn(api_key_middleware));

    let protected_routes = ApiRouter::new()
        .api_route("/roast/{roastID}", get(roasts::get_roast))
        .api_route("/saveRoast", post(users::save_roast))
        .api_route("/removeRoast", post(users::remove_saved_roast))
        .api_route("/review", post(reviews::create_review))
        .api_route("/removeReview", post(reviews::remove_review))
        .api_route("/user/{userID}", get(users::get_user))
        .api_route("/userSettings/{userID}", post(users::update_user_settings))
        .api_route("/newImage", get(images::new_image))
        .layer(middleware::from_fn(auth_middleware));

    public_routes
        .merge(admin_routes)
        .merge(protected_routes)
        .merge(docs::handler(environment))
}
