//! End-to-end navigation scenarios

use gridnav::ai::{
    FollowState, Grid, GridCoord, LineOfSight, Navigator, Obstacle, ObstacleMap, Path,
    PathFollower, find_path, get_distance, smooth_path,
};
use gridnav::core::{FollowerConfig, GridConfig, NavConfig, NavEvent};
use gridnav::glam::{Vec2, Vec3};

fn small_grid() -> Grid {
    Grid::new(
        &GridConfig::default()
            .with_world_size(Vec2::splat(10.0))
            .with_character_size(0.0),
    )
}

fn world(grid: &Grid, x: usize, y: usize) -> Vec3 {
    grid.node(GridCoord::new(x, y)).unwrap().world_position
}

/// Column 5 of the 10x10 grid blocked except its top cell
fn wall_with_gap() -> ObstacleMap {
    ObstacleMap::new().with(Obstacle::rect(Vec2::new(0.1, -5.0), Vec2::new(0.9, 3.9)))
}

fn assert_connected(grid: &Grid, path: &Path) {
    for pair in path.waypoints().windows(2) {
        assert!(grid.is_walkable(pair[1].coord));
        let step = get_distance(pair[0].coord, pair[1].coord);
        assert!(step == 10 || step == 14, "jump between {:?}", pair);
    }
}

#[test]
fn open_grid_diagonal() {
    let mut grid = small_grid();
    grid.rebuild(Vec3::ZERO, &|_: Vec3, _: f32| false);

    let (start, target) = (world(&grid, 0, 0), world(&grid, 9, 9));
    let path = find_path(&mut grid, start, target).unwrap();

    assert_eq!(path.len(), 10);
    for (i, coord) in path.coords().enumerate() {
        assert_eq!(coord, GridCoord::new(i, i));
    }
}

#[test]
fn wall_with_gap_goes_through_the_gap() {
    let mut grid = small_grid();
    let map = wall_with_gap();
    grid.rebuild(Vec3::ZERO, &map);

    assert!(!grid.is_walkable(GridCoord::new(5, 0)));
    assert!(!grid.is_walkable(GridCoord::new(5, 8)));
    assert!(grid.is_walkable(GridCoord::new(5, 9)));
    assert!(grid.is_walkable(GridCoord::new(4, 0)));
    assert!(grid.is_walkable(GridCoord::new(6, 0)));

    let (start, target) = (world(&grid, 0, 0), world(&grid, 9, 0));
    let path = find_path(&mut grid, start, target).unwrap();

    assert_eq!(path.coords().next(), Some(GridCoord::new(0, 0)));
    assert_eq!(path.coords().last(), Some(GridCoord::new(9, 0)));
    assert!(path.coords().any(|coord| coord == GridCoord::new(5, 9)));
    assert_connected(&grid, &path);
}

#[test]
fn smoothed_path_keeps_sight_between_waypoints() {
    let mut grid = small_grid();
    let map = wall_with_gap();
    grid.rebuild(Vec3::ZERO, &map);
    let (start, target) = (world(&grid, 0, 0), world(&grid, 9, 0));
    let raw = find_path(&mut grid, start, target).unwrap();

    let smoothed = smooth_path(&raw, &map);

    assert!(smoothed.len() < raw.len());
    assert_eq!(smoothed.waypoints().first(), raw.waypoints().first());
    assert_eq!(smoothed.waypoints().last(), raw.waypoints().last());
    for pair in smoothed.waypoints().windows(2) {
        assert!(map.has_line_of_sight(pair[0].world_position, pair[1].world_position));
    }
}

#[test]
fn follower_walks_a_searched_path() {
    let mut grid = small_grid();
    grid.rebuild(Vec3::ZERO, &|_: Vec3, _: f32| false);
    let (start, target) = (world(&grid, 0, 0), world(&grid, 4, 0));
    let path = find_path(&mut grid, start, target).unwrap();
    let end = path.waypoints()[4].world_position;

    let mut follower = PathFollower::new(&FollowerConfig::default(), false);
    let mut events = Vec::new();
    let mut position = world(&grid, 0, 0);
    assert!(follower.follow_path(path, position, &mut events));
    assert_eq!(follower.current_index(), 2);

    for _ in 0..100 {
        position = follower.tick(position, 0.1, &mut events);
        if !follower.is_following() {
            break;
        }
    }
    follower.tick(position, 0.1, &mut events);

    let count = |wanted: &NavEvent| events.iter().filter(|event| *event == wanted).count();
    assert_eq!(count(&NavEvent::StartMove), 1);
    assert_eq!(count(&NavEvent::MovedRight), 1);
    assert_eq!(count(&NavEvent::ChangedHorizontalSide), 1);
    assert_eq!(count(&NavEvent::PathCompleted), 1);
    assert_eq!(count(&NavEvent::EndMove), 1);
    assert_eq!(count(&NavEvent::MovedUp) + count(&NavEvent::MovedDown), 0);
    assert_eq!(events.last(), Some(&NavEvent::EndMove));
    assert!(position.distance(end) < 0.25);
}

#[test]
fn empty_path_stops_the_follower() {
    let mut grid = small_grid();
    grid.rebuild(Vec3::ZERO, &|_: Vec3, _: f32| false);
    let (start, target) = (world(&grid, 0, 0), world(&grid, 4, 0));
    let path = find_path(&mut grid, start, target).unwrap();

    let mut follower = PathFollower::new(&FollowerConfig::default(), false);
    let mut events = Vec::new();
    follower.follow_path(path, world(&grid, 0, 0), &mut events);
    assert_eq!(follower.state(), FollowState::Following);

    assert!(!follower.follow_path(Path::default(), Vec3::ZERO, &mut events));
    assert_eq!(follower.state(), FollowState::Idle);
    assert_eq!(follower.path().len(), 5);
}

fn walk_around_wall(config: &NavConfig) -> (Vec3, Navigator) {
    let obstacles = ObstacleMap::new()
        .with(Obstacle::rect(Vec2::new(-0.5, -9.0), Vec2::new(0.5, 3.0)))
        .with_sight_clearance(0.3);
    let target = Vec3::new(6.0, 0.0, 0.0);
    let mut agent = Vec3::new(-6.0, 0.0, 0.0);
    let mut navigator = Navigator::new(config);

    for _ in 0..800 {
        agent = navigator.update(&obstacles, agent, target, 0.05);
        let inside_wall = agent.x.abs() < 0.25 && agent.y > -8.75 && agent.y < 2.75;
        assert!(!inside_wall, "agent walked into the wall at {agent}");
    }

    assert!(agent.distance(target) < 1.5, "agent stopped at {agent}");
    (agent, navigator)
}

#[test]
fn navigator_walks_around_wall() {
    let (agent, navigator) = walk_around_wall(&NavConfig::default());

    assert!(agent.x > 4.0);
    assert!(navigator.debug().rebuilds() > 1);
    assert_eq!(navigator.debug().search_stats.failures(), 0);
}

#[test]
fn navigator_walks_around_wall_with_smoothing() {
    let config = NavConfig::default().with_smoothing(true);
    let (agent, navigator) = walk_around_wall(&config);

    assert!(agent.x > 4.0);
    assert!(navigator.follower().reach_threshold() > 0.5);
}

#[test]
fn config_file_drives_the_navigator() {
    let config = NavConfig::from_ron_str(
        "(grid: (world_size: (30.0, 30.0)), pathfinding: (smoothing: true))",
    )
    .unwrap();
    let navigator = Navigator::new(&config);

    assert_eq!(navigator.grid().size_x(), 30);
    assert_eq!(navigator.follower().reach_threshold(), 1.0);
}
