//! Plans: ordered action sequences targeting one goal.

use crate::action::Action;
use crate::goal::Goal;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub goal: Goal,
}

impl Plan {
    pub fn new(actions: Vec<Action>, goal: Goal) -> Self {
        Self { actions, goal }
    }

    /// An empty plan means the goal already holds.
    pub fn is_complete(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn cost(&self) -> f64 {
        self.actions.iter().map(|a| a.cost).sum()
    }

    pub fn actions_value(&self) -> f64 {
        self.actions.iter().map(|a| a.value).sum()
    }

    pub fn net_value(&self) -> f64 {
        self.goal.value + self.actions_value() - self.cost()
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Ranking order for plan lists: net value descending, then lower cost,
    /// then goal name.
    pub fn preference_order(a: &Plan, b: &Plan) -> Ordering {
        b.net_value()
            .partial_cmp(&a.net_value())
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.cost()
                    .partial_cmp(&b.cost())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.goal.name.cmp(&b.goal.name))
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] -> {} (net {:.2})",
            self.action_names().join(", "),
            self.goal.name,
            self.net_value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(goal_name: &str, goal_value: f64, costs: &[f64]) -> Plan {
        let actions = costs
            .iter()
            .enumerate()
            .map(|(i, c)| Action::new(format!("a{i}")).with_cost(*c))
            .collect();
        Plan::new(actions, Goal::new(goal_name).with_value(goal_value))
    }

    #[test]
    fn net_value_accounts_for_goal_actions_and_cost() {
        let mut p = plan("g", 10.0, &[1.5, 2.5]);
        p.actions[0].value = 1.0;
        assert_eq!(p.cost(), 4.0);
        assert_eq!(p.actions_value(), 1.0);
        assert_eq!(p.net_value(), 7.0);
    }

    #[test]
    fn preference_orders_by_net_value_then_cost_then_name() {
        let rich = plan("b", 10.0, &[1.0]);
        let poor = plan("a", 5.0, &[1.0]);
        let mut plans = vec![poor.clone(), rich.clone()];
        plans.sort_by(Plan::preference_order);
        assert_eq!(plans[0].goal.name, "b");

        // Equal net value: cheaper plan first.
        let cheap = plan("c", 6.0, &[1.0]);
        let pricey = plan("d", 7.0, &[2.0]);
        let mut plans = vec![pricey.clone(), cheap.clone()];
        plans.sort_by(Plan::preference_order);
        assert_eq!(plans[0].goal.name, "c");

        // Full tie: alphabetical goal name.
        let left = plan("x", 5.0, &[1.0]);
        let right = plan("y", 5.0, &[1.0]);
        let mut plans = vec![right, left];
        plans.sort_by(Plan::preference_order);
        assert_eq!(plans[0].goal.name, "x");
    }

    #[test]
    fn empty_plan_is_complete() {
        assert!(plan("g", 1.0, &[]).is_complete());
        assert!(!plan("g", 1.0, &[1.0]).is_complete());
    }
}
