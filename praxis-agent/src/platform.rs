//! The platform: agent registry, process factory, shared services.
//!
//! All process-wide state (event bus, repository, scheduler, LLM client)
//! is constructed here and injected; nothing reaches for globals.

use crate::agent::Agent;
use crate::names;
use crate::options::ProcessOptions;
use crate::process::AgentProcess;
use crate::repository::{InMemoryProcessRepository, ProcessRepository};
use crate::scheduler::{ProcessScheduler, ProntoScheduler};
use crate::validation::{validate_agent, ValidationReport};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use praxis_core::{AgentEvent, DomainObject, EventBus};
use praxis_llm::{LlmClient, LlmOperations, LlmOptions, PricingModel};
use std::collections::HashMap;
use std::sync::Arc;

pub struct AgentPlatform {
    agents: RwLock<HashMap<String, Arc<Agent>>>,
    repository: Arc<dyn ProcessRepository>,
    scheduler: Arc<dyn ProcessScheduler>,
    events: Arc<EventBus>,
    llm: Arc<dyn LlmClient>,
    pricing: Option<PricingModel>,
}

impl AgentPlatform {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            repository: Arc::new(InMemoryProcessRepository::default()),
            scheduler: Arc::new(ProntoScheduler),
            events: Arc::new(EventBus::new()),
            llm,
            pricing: None,
        }
    }

    pub fn with_repository(mut self, repository: Arc<dyn ProcessRepository>) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn ProcessScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingModel) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    pub fn repository(&self) -> Arc<dyn ProcessRepository> {
        self.repository.clone()
    }

    /// Validate and register an agent. Validation errors abort deployment.
    pub fn deploy(&self, agent: Agent) -> Result<Arc<Agent>, ValidationReport> {
        let report = validate_agent(&agent);
        if !report.is_valid() {
            tracing::warn!(agent = %agent.name, %report, "agent failed validation");
            return Err(report);
        }
        let agent = Arc::new(agent);
        self.events.emit(
            None,
            AgentEvent::AgentDeployed {
                agent: agent.name.clone(),
            },
        );
        tracing::info!(agent = %agent.name, "agent deployed");
        self.agents
            .write()
            .insert(agent.name.clone(), agent.clone());
        Ok(agent)
    }

    pub fn agent(&self, name: &str) -> Option<Arc<Agent>> {
        self.agents.read().get(name).cloned()
    }

    /// Create (and store) a process running `agent_name` with the given
    /// initial bindings as the user intent.
    pub fn create_agent_process(
        &self,
        agent_name: &str,
        options: ProcessOptions,
        bindings: Vec<(String, DomainObject)>,
    ) -> Result<Arc<AgentProcess>> {
        let agent = self
            .agent(agent_name)
            .with_context(|| format!("no deployed agent named `{agent_name}`"))?;

        let id = names::unique_name(|candidate| self.repository.find_by_id(candidate).is_some());

        let llm_options = LlmOptions {
            show_prompts: options.verbosity.show_prompts,
            show_responses: options.verbosity.show_llm_responses,
            ..LlmOptions::default()
        };
        let facade = if options.test {
            LlmOperations::stub(self.events.clone())
        } else {
            let mut facade = LlmOperations::new(self.llm.clone(), self.events.clone())
                .with_options(llm_options);
            if let Some(pricing) = self.pricing {
                facade = facade.with_pricing(pricing);
            }
            facade
        };

        let process = Arc::new(AgentProcess::new(
            id,
            agent.clone(),
            options,
            self.events.clone(),
            self.scheduler.clone(),
            Arc::new(facade),
        ));
        for (key, object) in bindings {
            process.bind(key, object);
        }

        self.events.emit(
            Some(process.id()),
            AgentEvent::ProcessCreated {
                agent: agent.name.clone(),
            },
        );
        tracing::info!(process = %process.id(), agent = %agent.name, "process created");
        self.repository.save(process.clone());
        Ok(process)
    }

    /// Spawn and store a child of `parent` running `agent`.
    pub fn create_child_process(
        &self,
        parent: &AgentProcess,
        agent: Arc<Agent>,
    ) -> Arc<AgentProcess> {
        let child = parent.create_child(agent);
        self.events.emit(
            Some(child.id()),
            AgentEvent::ProcessCreated {
                agent: child.agent().name.clone(),
            },
        );
        self.repository.save(child.clone());
        child
    }

    pub fn find_process(&self, id: &str) -> Option<Arc<AgentProcess>> {
        self.repository.find_by_id(id)
    }

    pub fn processes(&self) -> Vec<Arc<AgentProcess>> {
        self.repository.list()
    }

    /// Kill a stored process. Returns whether the kill transition fired.
    pub fn kill_process(&self, id: &str) -> bool {
        self.repository
            .find_by_id(id)
            .and_then(|process| process.kill())
            .is_some()
    }
}
