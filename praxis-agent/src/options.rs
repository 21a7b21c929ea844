//! Per-process options.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub show_prompts: bool,
    pub show_llm_responses: bool,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    pub verbosity: Verbosity,
    /// Whether the planner may switch the process to a different goal after
    /// the first plan.
    pub allow_goal_change: bool,
    /// Keep running after a failed action instead of failing the process.
    pub continue_on_action_failure: bool,
    /// Swap the LLM facade for the deterministic stub.
    pub test: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            allow_goal_change: true,
            continue_on_action_failure: false,
            test: false,
        }
    }
}

impl ProcessOptions {
    pub fn test() -> Self {
        Self {
            test: true,
            ..Self::default()
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn disallow_goal_change(mut self) -> Self {
        self.allow_goal_change = false;
        self
    }

    pub fn continue_on_action_failure(mut self) -> Self {
        self.continue_on_action_failure = true;
        self
    }
}
