//! Replay driver: pipes a feed into a session.

use propguard_domain::SessionEvent;
use propguard_engine::{Session, SessionSnapshot};
use tracing::{debug, info};

use crate::error::SimResult;
use crate::feed::PriceFeed;

/// Drive price ticks from `feed` into `session` until the feed ends or the
/// account locks. Returns the final snapshot.
pub async fn replay<F>(session: &mut Session, feed: &mut F) -> SimResult<SessionSnapshot>
where
    F: PriceFeed + ?Sized,
{
    let mut ticks = 0usize;
    let mut snapshot = session.snapshot();

    while !snapshot.stats.is_locked {
        let Some(price) = feed.next_price().await else {
            debug!(session_id = %session.id(), ticks, "Feed ended");
            return Ok(snapshot);
        };

        snapshot = session.apply(SessionEvent::PriceTick { price })?;
        ticks += 1;
    }

    info!(
        session_id = %session.id(),
        ticks,
        reason = ?snapshot.stats.fail_message(),
        "Replay stopped: account locked"
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::ScriptedFeed;
    use propguard_domain::{OrderRequest, Price, Symbol};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_replay_consumes_whole_feed() {
        let mut session = Session::new(dec!(1000000)).unwrap();
        let mut feed = ScriptedFeed::from_decimals(&[dec!(100), dec!(101), dec!(102)]).unwrap();

        let snapshot = replay(&mut session, &mut feed).await.unwrap();

        assert_eq!(snapshot.market_price.as_decimal(), dec!(102));
        assert_eq!(feed.remaining(), 0);
        assert!(!snapshot.stats.is_locked);
    }

    #[tokio::test]
    async fn test_replay_stops_at_lock() {
        let mut session = Session::new(dec!(1000000)).unwrap();
        session.apply_price_tick(Price::new(dec!(100)).unwrap());
        session
            .place_order(&OrderRequest::buy(Symbol::parse("NSE:NIFTY").unwrap(), dec!(1000)))
            .unwrap();

        let mut feed =
            ScriptedFeed::from_decimals(&[dec!(90), dec!(40), dec!(100), dec!(120)]).unwrap();
        let snapshot = replay(&mut session, &mut feed).await.unwrap();

        assert!(snapshot.stats.is_locked);
        assert_eq!(snapshot.market_price.as_decimal(), dec!(40));
        assert_eq!(feed.remaining(), 2);
    }
}
