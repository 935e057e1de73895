use rand::rngs::StdRng;
use rand::SeedableRng;

use token_pulse::config::FeedConfig;
use token_pulse::feed::{percent_change, FeedSimulator, PriceFeed, RandomWalk, TickBuffer, DEFAULT_CAPACITY};

#[test]
fn test_long_walk_respects_capacity_floor_and_fresh_average() {
    let simulator = FeedSimulator::default();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut buffer = TickBuffer::new(DEFAULT_CAPACITY);

    for i in 0..500 {
        let next = simulator.tick_at(&buffer, format!("t{}", i), &mut rng);
        assert!(next.len() <= DEFAULT_CAPACITY);
        assert_eq!(next.len(), (buffer.len() + 1).min(DEFAULT_CAPACITY));

        let latest = next.latest().unwrap();
        assert!(latest.price >= 90_000.0);
        assert!(latest.volume >= 500.0);

        let prices = next.prices();
        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        assert!((latest.ma - mean).abs() < 1e-6, "tick {} ma drifted", i);
        buffer = next;
    }
}

#[test]
fn test_price_pinned_at_floor_stays_there() {
    let simulator = FeedSimulator::new(RandomWalk {
        initial_price: 90_000.0,
        ..RandomWalk::default()
    });
    let mut rng = StdRng::seed_from_u64(1);
    let mut buffer = TickBuffer::new(DEFAULT_CAPACITY);

    for _ in 0..200 {
        buffer = simulator.tick_at(&buffer, "10:00", &mut rng);
        assert!(buffer.latest().unwrap().price >= 90_000.0);
    }
}

#[test]
fn test_tick_leaves_input_untouched() {
    let feed = PriceFeed::from_config(&FeedConfig::default());
    let opening = feed.snapshot().ticks;
    let copy = opening.clone();

    let next = FeedSimulator::default().tick_at(&opening, "15:30", &mut StdRng::seed_from_u64(8));

    assert_eq!(opening, copy);
    assert_ne!(next, opening);
    assert_eq!(next.oldest().unwrap().time, "09:30");
}

// Known characteristic: the change is measured against the oldest retained
// tick, so it moves as the window slides even when the price does not.
#[test]
fn test_change_denominator_slides_with_window() {
    let config = FeedConfig {
        max_step: 0.0,
        ..FeedConfig::default()
    };
    let feed = PriceFeed::from_config(&config);
    let mut rng = StdRng::seed_from_u64(0);

    let first = feed.advance_at("15:30", &mut rng);
    let second = feed.advance_at("16:00", &mut rng);

    assert_eq!(first.current_price, 97_234.0);
    assert_eq!(second.current_price, 97_234.0);
    assert!((first.price_change - (97_234.0 - 95_200.0) / 95_200.0 * 100.0).abs() < 1e-9);
    assert!((second.price_change - (97_234.0 - 94_950.0) / 94_950.0 * 100.0).abs() < 1e-9);
    assert_ne!(first.price_change, second.price_change);
    assert_eq!(percent_change(&second.ticks), Some(second.price_change));
}

#[tokio::test]
async fn test_observers_receive_replacements() {
    let feed = PriceFeed::from_config(&FeedConfig::default());
    let mut rx = feed.subscribe();
    let held = rx.borrow_and_update().clone();

    feed.advance_at("15:30", &mut StdRng::seed_from_u64(4));

    assert!(rx.has_changed().unwrap());
    let current = rx.borrow_and_update().clone();
    assert_ne!(current.ticks, held.ticks);
    // the copy taken earlier is not affected by the tick
    assert_eq!(held.ticks.latest().unwrap().time, "15:00");

    feed.reset();
    assert_eq!(feed.snapshot().ticks, held.ticks);
    assert_eq!(feed.snapshot().price_change, 2.45);
}
