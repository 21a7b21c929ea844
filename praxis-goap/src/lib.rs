/*!
# Praxis GOAP

Goal-oriented action planning for the Praxis platform: A* search over
three-valued world states with relevance pruning and lazy resolution of
`Unknown` conditions through a [`WorldStateDeterminer`].

```rust
use praxis_core::{Action, Goal, PlanningSystem, WorldState};
use praxis_goap::{AStarPlanner, FixedWorldStateDeterminer};

let system = PlanningSystem::new(
    vec![
        Action::new("boil_water").with_effect("water_hot", true),
        Action::new("brew")
            .with_precondition("water_hot", true)
            .with_effect("tea_ready", true),
    ],
    vec![Goal::new("tea").with_precondition("tea_ready", true)],
);

let determiner = FixedWorldStateDeterminer::new(WorldState::new());
let plan = AStarPlanner::new()
    .best_value_plan_to_any_goal(&system, &determiner)
    .unwrap()
    .unwrap();
assert_eq!(plan.action_names(), vec!["boil_water", "brew"]);
```
*/

pub mod determiner;
mod node;
pub mod planner;
pub mod prune;

pub use determiner::{FixedWorldStateDeterminer, RecordingDeterminer, WorldStateDeterminer};
pub use planner::AStarPlanner;
pub use prune::{prune_system, relevant_actions};
