//! dine-monitor: terminal follower for the restaurant backend
//!
//! Signs in (when credentials are given), then follows one of the live
//! views and prints each snapshot until Ctrl+C.

mod cli;
mod logger;
mod render;

use anyhow::{Context, bail};
use clap::Parser;
use dine_client::session::IdentityCache;
use dine_client::views::{
    CancelRequest, DashboardStrip, KitchenQueue, OrderAlerts, OrderDetail, PaymentResult,
    TableLookup, TableTracker, WaiterBoard,
};
use dine_client::{
    Access, ApiClient, PollState, RealtimeChannel, SessionGate, StaffView, ViewState,
};
use tokio::sync::watch;

use cli::{Cli, Command, LoginArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap sees its values
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logger::init_logger(&cli.log_level, cli.log_json, cli.log_dir.as_deref())?;

    if let Command::PaymentResult { query, table_number } = &cli.command {
        let result = PaymentResult::from_query(query, *table_number);
        println!("{}\n{}", result.outcome.title(), result.text());
        return Ok(());
    }

    let config = cli.client_config();
    tracing::info!(api = %config.api_base_url, "Starting dine-monitor");
    let api = ApiClient::new(&config).context("failed to build HTTP client")?;
    let realtime = (!cli.no_realtime).then(|| RealtimeChannel::connect(&config));

    let gate = SessionGate::new(
        api.clone(),
        config.identity_cache_path.clone().map(IdentityCache::new),
    );
    sign_in(&gate, &cli.login).await?;

    let result = run(cli.command, api, realtime.clone(), &gate).await;
    if let Some(channel) = realtime {
        channel.shutdown();
    }
    result
}

async fn sign_in(gate: &SessionGate, login: &LoginArgs) -> anyhow::Result<()> {
    match login.credentials() {
        Some((email, password)) => {
            let response = gate.login(email, password).await.context("login failed")?;
            if response.must_change_password {
                tracing::warn!("Password change required before using the staff views");
            }
        }
        None => {
            gate.initialize().await;
        }
    }
    if let Some(user) = gate.user() {
        tracing::info!(user = %user.full_name(), role = ?user.role_name(), "Signed in");
    }
    Ok(())
}

fn require(gate: &SessionGate, view: StaffView) -> anyhow::Result<()> {
    match gate.access(view) {
        Access::Granted => Ok(()),
        Access::LoginRequired => bail!("{view:?} needs a signed-in staff member (set --email and --password)"),
        Access::Denied => bail!("{view:?} is not available to this role"),
        Access::Pending => bail!("session still loading"),
    }
}

async fn run(
    command: Command,
    api: ApiClient,
    realtime: Option<RealtimeChannel>,
    gate: &SessionGate,
) -> anyhow::Result<()> {
    match command {
        Command::Kitchen { dashboard } => {
            require(gate, StaffView::Kitchen)?;
            let queue =
                KitchenQueue::with_interval(api, realtime.as_ref(), cli::kitchen_interval(dashboard));
            follow(queue.watch(), || queue.view(), |s| print!("{}", render::kitchen(s))).await
        }
        Command::Advance { order_id, item_id } => {
            require(gate, StaffView::Kitchen)?;
            let queue = KitchenQueue::new(api, None);
            loaded(queue.watch()).await?;
            let cooked_by = gate.user().map(|u| u.id);
            let order = queue.advance_item(&order_id, &item_id, cooked_by).await?;
            print!("{}", render::order(&order));
            Ok(())
        }
        Command::Track { table } => {
            let lookup = match (table.table_id, table.table_number) {
                (Some(id), _) => TableLookup::Id(id),
                (None, Some(number)) => TableLookup::Number(number),
                (None, None) => bail!("a table id or number is required"),
            };
            let tracker = TableTracker::new(api, realtime, lookup);
            let table_id = tracker.resolve().await.context("table lookup failed")?;
            tracing::info!(%table_id, "Tracking table");
            follow(tracker.watch(), || tracker.view(), |orders| {
                print!("{}", render::tracked_orders(orders))
            })
            .await
        }
        Command::Order { order_id } => {
            require(gate, StaffView::OrderDetail)?;
            let detail = OrderDetail::new(api, realtime.as_ref(), order_id);
            follow(detail.watch(), || detail.view(), |o| print!("{}", render::order(o))).await
        }
        Command::Cancel { order_id, reason } => {
            require(gate, StaffView::OrderDetail)?;
            let request = CancelRequest::new(&reason)?;
            let detail = OrderDetail::new(api, None, order_id);
            loaded(detail.watch()).await?;
            let order = detail.cancel(request.confirm()).await?;
            print!("{}", render::order(&order));
            Ok(())
        }
        Command::Dashboard => {
            require(gate, StaffView::RealTime)?;
            let strip = DashboardStrip::new(api, realtime.as_ref());
            follow(strip.watch(), || strip.view(), |s| println!("{}", render::stats(s))).await
        }
        Command::Waiter => {
            require(gate, StaffView::Dashboard)?;
            let Some(user) = gate.user() else {
                bail!("waiter board needs a signed-in user");
            };
            let board = WaiterBoard::new(api, user.id);
            follow(board.watch(), || board.view(), |s| println!("{}", render::waiter(s))).await
        }
        Command::Alerts => {
            require(gate, StaffView::Dashboard)?;
            let Some(channel) = realtime else {
                bail!("alerts need the realtime channel");
            };
            let mut alerts = OrderAlerts::new(&channel);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => return Ok(()),
                    alert = alerts.next() => match alert {
                        Some(alert) => println!(
                            "New order: table {} {} ({} items) {}",
                            alert.table,
                            alert.customer,
                            alert.item_count,
                            alert.target_path()
                        ),
                        None => return Ok(()),
                    },
                }
            }
        }
        Command::PaymentResult { .. } => Ok(()),
    }
}

/// Wait for the first fetch to settle; fails when it failed
async fn loaded<T>(mut updates: watch::Receiver<PollState<T>>) -> anyhow::Result<()> {
    let state = updates
        .wait_for(|s| !s.is_loading)
        .await
        .context("view closed before loading")?;
    match (&state.data, &state.error) {
        (None, Some(e)) => bail!("{e}"),
        _ => Ok(()),
    }
}

/// Print every new snapshot until Ctrl+C
async fn follow<S, T>(
    mut updates: watch::Receiver<PollState<S>>,
    view: impl Fn() -> ViewState<T>,
    render: impl Fn(&T),
) -> anyhow::Result<()> {
    loop {
        match view() {
            ViewState::Loading => tracing::debug!("Loading"),
            ViewState::Empty => println!("Nothing to show"),
            ViewState::Ready(data) => render(&data),
            ViewState::Failed(e) => tracing::warn!(error = %e, "Refresh failed"),
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                return Ok(());
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
        }
    }
}
