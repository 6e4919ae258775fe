//! Admin guard.

use salvo::prelude::*;

use crate::extensions::*;

/// Reject callers whose session does not belong to an admin.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if let Err(error) = depot.admin_or_403() {
        res.render(error);

        return;
    }

    ctrl.call_next(req, depot, res).await;
}
