use super::*;

#[test]
fn test_clock_counts_down_running_side_only() {
    let mut clock = Clock::new(1);
    clock.reset(Color::White);
    clock.tick();
    clock.tick();
    assert_eq!(clock.remaining(Color::White), 58);
    assert_eq!(clock.remaining(Color::Black), 60);

    clock.switch_to(Color::Black);
    clock.tick();
    assert_eq!(clock.remaining(Color::Black), 59);
}

#[test]
fn test_stopped_clock_does_not_tick() {
    let mut clock = Clock::new(1);
    assert_eq!(clock.tick(), None);
    clock.switch_to(Color::White);
    assert_eq!(clock.running_for(), None);
    assert_eq!(clock.remaining(Color::White), 60);
}

#[test]
fn test_flag_fall_stops_clock() {
    let mut clock = Clock::new(1);
    clock.reset(Color::Black);
    let mut fallen = None;
    for _ in 0..60 {
        fallen = clock.tick();
    }
    assert_eq!(fallen, Some(Color::Black));
    assert_eq!(clock.flagged(), Some(Color::Black));
    assert_eq!(clock.running_for(), None);
    assert_eq!(clock.tick(), None);
}

#[test]
fn test_format_time() {
    assert_eq!(Clock::format_time(600), "10:00");
    assert_eq!(Clock::format_time(65), "01:05");
    assert_eq!(Clock::format_time(0), "00:00");
}

#[test]
fn test_points_decide_flag_fall() {
    assert_eq!(decide_on_points(&Game::new()), PointsVerdict::Equal);
    assert_eq!(
        PointsVerdict::Equal.to_string(),
        "Draw by equal points!"
    );

    // White is a rook up
    let game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    assert_eq!(material_points(&game, Color::White), 5);
    assert_eq!(material_points(&game, Color::Black), 0);
    let verdict = decide_on_points(&game);
    assert_eq!(verdict, PointsVerdict::Winner(Color::White));
    assert_eq!(verdict.to_string(), "White wins on points!");
}

#[test]
fn test_huge_minutes_saturate() {
    let clock = Clock::new(u32::MAX);
    assert_eq!(clock.remaining(Color::White), u32::MAX);
    assert_eq!(clock.remaining(Color::Black), u32::MAX);
}
