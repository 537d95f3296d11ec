//! Unit tests for per-user and per-day reservation caps.

use super::support::{config_with_limits, date, seed_confirmed, seed_reservation, time};
use crate::reservation::{
    adapters::memory::InMemoryReservationStore,
    domain::{ReservationStatus, TableId, UserId},
    ports::ReservationStore,
    services::LimitPolicy,
};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn reservations() -> Arc<InMemoryReservationStore> {
    Arc::new(InMemoryReservationStore::new())
}

fn policy_with_caps(
    reservations: &Arc<InMemoryReservationStore>,
    per_user: usize,
    per_day: usize,
) -> LimitPolicy<InMemoryReservationStore> {
    LimitPolicy::new(Arc::clone(reservations), config_with_limits(per_user, per_day))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_below_cap_may_book(
    reservations: Arc<InMemoryReservationStore>,
) -> eyre::Result<()> {
    let on = date(2024, 7, 1);
    seed_reservation(&reservations, "guest-1", TableId::new(), on, time(18, 0)).await;
    seed_confirmed(&reservations, "guest-1", TableId::new(), on, time(12, 0)).await;
    let policy = policy_with_caps(&reservations, 3, 50);

    ensure!(policy.can_user_book(&UserId::new("guest-1")?).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_at_cap_may_not_book(
    reservations: Arc<InMemoryReservationStore>,
) -> eyre::Result<()> {
    // Active reservations count across dates, not just the requested day.
    seed_reservation(
        &reservations,
        "guest-1",
        TableId::new(),
        date(2024, 7, 1),
        time(18, 0),
    )
    .await;
    seed_reservation(
        &reservations,
        "guest-1",
        TableId::new(),
        date(2024, 7, 2),
        time(18, 0),
    )
    .await;
    seed_confirmed(
        &reservations,
        "guest-1",
        TableId::new(),
        date(2024, 7, 3),
        time(18, 0),
    )
    .await;
    let policy = policy_with_caps(&reservations, 3, 50);

    ensure!(!policy.can_user_book(&UserId::new("guest-1")?).await?);
    Ok(())
}

#[rstest]
#[case(ReservationStatus::Cancelled)]
#[tokio::test(flavor = "multi_thread")]
async fn released_reservations_do_not_count_towards_the_user_cap(
    #[case] released: ReservationStatus,
    reservations: Arc<InMemoryReservationStore>,
) -> eyre::Result<()> {
    let on = date(2024, 7, 1);
    seed_reservation(&reservations, "guest-1", TableId::new(), on, time(12, 0)).await;
    let mut second =
        seed_reservation(&reservations, "guest-1", TableId::new(), on, time(18, 0)).await;
    second.transition_to(released, &DefaultClock)?;
    reservations.update(&second).await?;
    let policy = policy_with_caps(&reservations, 2, 50);

    ensure!(policy.can_user_book(&UserId::new("guest-1")?).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_users_reservations_do_not_count(
    reservations: Arc<InMemoryReservationStore>,
) -> eyre::Result<()> {
    let on = date(2024, 7, 1);
    seed_confirmed(&reservations, "guest-2", TableId::new(), on, time(12, 0)).await;
    seed_confirmed(&reservations, "guest-2", TableId::new(), on, time(18, 0)).await;
    seed_reservation(&reservations, "guest-3", TableId::new(), on, time(18, 0)).await;
    let policy = policy_with_caps(&reservations, 1, 50);

    ensure!(policy.can_user_book(&UserId::new("guest-1")?).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn day_below_cap_accepts(reservations: Arc<InMemoryReservationStore>) -> eyre::Result<()> {
    let on = date(2024, 7, 1);
    seed_reservation(&reservations, "guest-1", TableId::new(), on, time(18, 0)).await;
    let policy = policy_with_caps(&reservations, 3, 2);

    ensure!(policy.can_day_accept(on).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn day_at_cap_rejects(reservations: Arc<InMemoryReservationStore>) -> eyre::Result<()> {
    let on = date(2024, 7, 1);
    seed_reservation(&reservations, "guest-1", TableId::new(), on, time(12, 0)).await;
    seed_confirmed(&reservations, "guest-2", TableId::new(), on, time(18, 0)).await;
    let policy = policy_with_caps(&reservations, 3, 2);

    ensure!(!policy.can_day_accept(on).await?);
    ensure!(policy.can_day_accept(date(2024, 7, 2)).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_reservations_do_not_count_towards_the_day_cap(
    reservations: Arc<InMemoryReservationStore>,
) -> eyre::Result<()> {
    let on = date(2024, 7, 1);
    seed_reservation(&reservations, "guest-1", TableId::new(), on, time(12, 0)).await;
    let mut second =
        seed_reservation(&reservations, "guest-2", TableId::new(), on, time(18, 0)).await;
    second.transition_to(ReservationStatus::Cancelled, &DefaultClock)?;
    reservations.update(&second).await?;
    let policy = policy_with_caps(&reservations, 3, 2);

    ensure!(policy.can_day_accept(on).await?);
    Ok(())
}
