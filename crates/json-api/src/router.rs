//! App Router

use salvo::Router;

use crate::{auth, carts, checkout, discounts, games, wallet};

/// Every route that needs a session. `/admin` additionally needs an admin.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(Router::with_path("checkout").post(checkout::create::handler))
        .push(Router::with_path("purchases").get(checkout::purchases::handler))
        .push(Router::with_path("discounts/apply").post(discounts::apply::handler))
        .push(
            Router::with_path("cart").get(carts::get::handler).push(
                Router::with_path("items")
                    .post(carts::items::create::handler)
                    .push(Router::with_path("{game}").delete(carts::items::delete::handler)),
            ),
        )
        .push(
            Router::with_path("wallet")
                .get(wallet::get::handler)
                .push(Router::with_path("deposits").post(wallet::deposit::handler)),
        )
        .push(Router::with_path("rankings").get(games::rankings::handler))
        .push(
            Router::with_path("admin").hoop(auth::admin::handler).push(
                Router::with_path("discounts")
                    .get(discounts::index::handler)
                    .post(discounts::create::handler)
                    .push(
                        Router::with_path("{uuid}")
                            .get(discounts::get::handler)
                            .put(discounts::update::handler)
                            .delete(discounts::delete::handler),
                    ),
            ),
        )
}
