use crate::{
    api::{adjustment, dashboard, payout, policy},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::{guard, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let write_limiter = Arc::new(build_limiter(config.rate_write_per_min));
    let calc_limiter = Arc::new(build_limiter(config.rate_calc_per_min));
    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/policies")
                    // POST /policies — writes pay the write rate
                    .service(
                        web::resource("")
                            .guard(guard::Post())
                            .wrap(write_limiter.clone())
                            .route(web::post().to(policy::set_policy)),
                    )
                    // GET /policies
                    .service(
                        web::resource("")
                            .guard(guard::Get())
                            .wrap(read_limiter.clone())
                            .route(web::get().to(policy::list_policies)),
                    )
                    // /policies/{staff_id}
                    .service(
                        web::resource("/{staff_id}")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(policy::get_policy)),
                    ),
            )
            .service(
                web::scope("/adjustments")
                    // POST /adjustments — append-only, no update or delete routes
                    .service(
                        web::resource("")
                            .guard(guard::Post())
                            .wrap(write_limiter.clone())
                            .route(web::post().to(adjustment::create_adjustment)),
                    )
                    // GET /adjustments
                    .service(
                        web::resource("")
                            .guard(guard::Get())
                            .wrap(read_limiter.clone())
                            .route(web::get().to(adjustment::list_adjustments)),
                    ),
            )
            .service(
                web::scope("/payouts")
                    // /payouts/calculate
                    .service(
                        web::resource("/calculate")
                            .wrap(calc_limiter.clone())
                            .route(web::post().to(payout::calculate)),
                    )
                    // /payouts/report
                    .service(
                        web::resource("/report")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(payout::report)),
                    )
                    // /payouts/{id}/mark-paid
                    .service(
                        web::resource("/{payout_id}/mark-paid")
                            .wrap(write_limiter.clone())
                            .route(web::post().to(payout::mark_paid)),
                    )
                    // /payouts/{id}
                    .service(
                        web::resource("/{payout_id}")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(payout::get_payout)),
                    ),
            )
            .service(
                web::scope("/dashboard").service(
                    web::resource("")
                        .wrap(read_limiter.clone())
                        .route(web::get().to(dashboard::dashboard)),
                ),
            ),
    );
}
