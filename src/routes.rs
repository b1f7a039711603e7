use crate::{
    api::{admin, expense, leave_request, manager},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Context, Result};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters, built once so every worker shares the same quota.
#[derive(Clone)]
pub struct RateLimiters {
    login: Limiter,
    register: Limiter,
    refresh: Limiter,
    protected: Limiter,
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .with_context(|| format!("invalid rate limit: {requests_per_min}/min"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

impl RateLimiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min)?,
            register: build_limiter(config.rate_register_per_min)?,
            refresh: build_limiter(config.rate_refresh_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &RateLimiters) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(limiters.register.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(limiters.refresh.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(limiters.protected.clone())
            .service(
                web::resource("/me")
                    .route(web::get().to(handlers::me))
                    .route(web::patch().to(handlers::update_me)),
            )
            .service(
                web::scope("/leaves")
                    .service(web::resource("/apply").route(web::post().to(leave_request::apply_leave)))
                    .service(
                        web::resource("/history").route(web::get().to(leave_request::leave_history)),
                    )
                    .service(
                        web::resource("/balance").route(web::get().to(leave_request::leave_balance)),
                    )
                    .service(
                        web::resource("/cancel/{id}")
                            .route(web::patch().to(leave_request::cancel_leave)),
                    )
                    // registered last so the literal paths above win
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave))),
            )
            .service(
                web::scope("/manager")
                    .service(
                        web::resource("/leaves/pending").route(web::get().to(manager::pending_leaves)),
                    )
                    .service(
                        web::resource("/leaves/approve/{id}")
                            .route(web::patch().to(manager::approve_leave)),
                    )
                    .service(
                        web::resource("/leaves/reject/{id}")
                            .route(web::patch().to(manager::reject_leave)),
                    )
                    .service(web::resource("/team").route(web::get().to(manager::my_team))),
            )
            .service(
                web::scope("/expenses")
                    .service(
                        web::resource("/submit").route(web::post().to(expense::submit_expense)),
                    )
                    .service(
                        web::resource("/history").route(web::get().to(expense::expense_history)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/users/{id}/role")
                            .route(web::patch().to(handlers::set_user_role)),
                    )
                    .service(web::resource("/team").route(web::put().to(admin::assign_team)))
                    .service(
                        web::resource("/team/{employee_id}")
                            .route(web::delete().to(admin::unassign_team)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new token pair, old refresh token revoked
