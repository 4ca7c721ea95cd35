pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::{DynOrderService, DynPromotionService, OrderService, PromotionService};
use domain::ports::{CatalogLookup, OrderRepository, PromotionRepository};
use errors::AppError;
use infrastructure::{DieselCatalog, DieselOrderRepository, DieselPromotionRepository};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_guest_order,
        handlers::orders::get_order,
        handlers::orders::update_status,
        handlers::orders::update_payment,
        handlers::dashboard::staff_orders,
        handlers::dashboard::orders_summary,
        handlers::promotions::apply_promotion,
        handlers::promotions::validate_code,
        handlers::promotions::redeem_promotion,
        handlers::promotions::create_promotion,
        handlers::promotions::list_promotions,
        handlers::promotions::get_promotion,
        handlers::promotions::update_promotion,
        handlers::promotions::deactivate_promotion,
    ),
    tags(
        (name = "orders", description = "Guest checkout and order lifecycle"),
        (name = "dashboard", description = "Staff views"),
        (name = "promotions", description = "Discount codes"),
    )
)]
pub struct ApiDoc;

/// Routes shared by the server and the handler tests. The caller supplies the
/// `DynOrderService` and `DynPromotionService` app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::{dashboard, orders, promotions};

    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Unprocessable(err.to_string()).into());

    cfg.app_data(json_config)
        .route("/orders/guest", web::post().to(orders::create_guest_order))
        .route("/orders/{order_number}", web::get().to(orders::get_order))
        .route(
            "/orders/{order_number}/status",
            web::patch().to(orders::update_status),
        )
        .route(
            "/orders/{order_number}/payment",
            web::patch().to(orders::update_payment),
        )
        .route(
            "/dashboard/staff/orders",
            web::get().to(dashboard::staff_orders),
        )
        .route(
            "/dashboard/manager/orders-summary",
            web::get().to(dashboard::orders_summary),
        )
        .route(
            "/promotions/apply",
            web::post().to(promotions::apply_promotion),
        )
        .route(
            "/promotions/redeem",
            web::post().to(promotions::redeem_promotion),
        )
        .route(
            "/promotions/validate/{code}",
            web::get().to(promotions::validate_code),
        )
        .service(
            web::resource("/promotions")
                .route(web::post().to(promotions::create_promotion))
                .route(web::get().to(promotions::list_promotions)),
        )
        .service(
            web::resource("/promotions/{id}")
                .route(web::get().to(promotions::get_promotion))
                .route(web::put().to(promotions::update_promotion))
                .route(web::delete().to(promotions::deactivate_promotion)),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let orders: Arc<dyn OrderRepository> = Arc::new(DieselOrderRepository::new(pool.clone()));
    let catalog: Arc<dyn CatalogLookup> = Arc::new(DieselCatalog::new(pool.clone()));
    let promotions: Arc<dyn PromotionRepository> = Arc::new(DieselPromotionRepository::new(pool));

    let order_service: web::Data<DynOrderService> =
        web::Data::new(OrderService::new(orders.clone(), catalog));
    let promotion_service: web::Data<DynPromotionService> =
        web::Data::new(PromotionService::new(promotions, orders));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(order_service.clone())
            .app_data(promotion_service.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
