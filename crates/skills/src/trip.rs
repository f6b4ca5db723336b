//! Trip Planner skills.
//!
//! Seven planning phases, each a prompt template run through the model,
//! plus two lookups over saved research and itineraries. Research,
//! itineraries and context snapshots are kept in separate vector namespaces.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use skiff_agent::Model;
use skiff_config::RateTable;
use skiff_core::error::SkillError;
use skiff_core::skill::{FieldSpec, InputSchema, Skill, SkillInputs};
use skiff_core::vector::VectorStore;
use std::sync::Arc;
use tracing::debug;

use crate::budget::{compute_budget, positive_count};
use crate::prompts;

pub const AGENT_ID: &str = "multi-agent-trip-planner";

pub const BEHAVIOR: &str = "You are an orchestrator managing multiple specialized travel agents working together \
to plan comprehensive trips. You have access to 7 specialized skills that simulate different agents: Destination \
Research, Flight Search, Accommodation Search, Activity Planning, Itinerary Building, Budget Calculation, and \
Context Management.

You should dynamically decide which agent skill to call next based on the conversation context and what \
information has already been gathered, rather than following a fixed sequence. Maintain awareness of what each \
'agent' has already done and ensure all aspects of trip planning are covered.

Start with destination research when users mention a trip, then intelligently handoff to other agents based on \
what's needed. Always maintain context between different planning phases and provide comprehensive, \
well-structured travel plans.";

pub const DESTINATIONS_NAMESPACE: &str = "destinations";
pub const TRAVEL_PLANS_NAMESPACE: &str = "travel_plans";
pub const TRIP_CONTEXT_NAMESPACE: &str = "trip_context";

/// The three vector namespaces the planner writes to.
#[derive(Clone)]
pub struct TripStores {
    pub destinations: Arc<dyn VectorStore>,
    pub travel_plans: Arc<dyn VectorStore>,
    pub trip_context: Arc<dyn VectorStore>,
}

fn failed<E: std::fmt::Display>(phase: &'static str) -> impl FnOnce(E) -> SkillError {
    move |e| SkillError::ExecutionFailed {
        skill: phase.to_string(),
        reason: e.to_string(),
    }
}

fn underscored(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join("_")
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub struct DestinationResearch {
    model: Model,
    store: Arc<dyn VectorStore>,
}

#[async_trait]
impl Skill for DestinationResearch {
    fn name(&self) -> &str {
        "destination_research"
    }

    fn description(&self) -> &str {
        "Research destinations, attractions, weather, best times to visit, and general travel information for a specified location"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field("destination", FieldSpec::text("The destination to research (city, country, or region)"))
            .field(
                "travel_dates",
                FieldSpec::text("Planned travel dates (e.g., \"2024-03-15 to 2024-03-22\")").optional(),
            )
            .field(
                "interests",
                FieldSpec::array("Traveler interests (e.g., [\"history\",\"museums\",\"food\"])").optional(),
            )
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        const PHASE: &str = "Destination research";
        let destination = inputs.require_text("destination")?;
        let travel_dates = inputs.display("travel_dates");
        let interests = inputs.display("interests");

        let prompt = prompts::destination_research(&prompts::DestinationResearch {
            destination,
            travel_dates: travel_dates.as_deref(),
            interests: interests.as_deref(),
        });
        let info = self.model.invoke(&prompt).await.map_err(failed(PHASE))?;

        let doc_id = format!("dest_{}_{}", underscored(destination), now_millis());
        let doc = format!(
            "Destination: {destination}\nResearch Date: {}\nTravel Dates: {}\nInterests: {}\nResearch: {info}",
            Utc::now().to_rfc3339(),
            travel_dates.as_deref().unwrap_or("Not specified"),
            interests.as_deref().unwrap_or("General"),
        );
        self.store.insert_doc(&doc_id, &doc).await.map_err(failed(PHASE))?;
        debug!(doc_id, "Destination research stored");

        Ok(json!({
            "destination_info": info,
            "context_update": format!(
                "Destination research completed for {destination}. Key info gathered: attractions, weather, culture, transportation, safety."
            ),
            "next_steps": "Consider searching for flights and accommodations based on travel dates.",
        }))
    }
}

pub struct FlightSearch {
    model: Model,
}

#[async_trait]
impl Skill for FlightSearch {
    fn name(&self) -> &str {
        "flight_search"
    }

    fn description(&self) -> &str {
        "Search for flight options, prices, and schedules between specified locations and dates"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field("origin", FieldSpec::text("Departure city/airport code"))
            .field("destination", FieldSpec::text("Destination city/airport code"))
            .field("departure_date", FieldSpec::text("Departure date (YYYY-MM-DD)"))
            .field(
                "return_date",
                FieldSpec::text("Return date (YYYY-MM-DD), optional for one-way").optional(),
            )
            .field("passengers", FieldSpec::number("Number of passengers").optional())
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let origin = inputs.require_text("origin")?;
        let destination = inputs.require_text("destination")?;
        let departure = inputs.require_text("departure_date")?;
        let return_date = inputs.display("return_date");
        let passengers = inputs.display("passengers");

        let prompt = prompts::flight_search(&prompts::FlightSearch {
            origin,
            destination,
            departure_date: departure,
            return_date: return_date.as_deref(),
            passengers: passengers.as_deref(),
        });
        let info = self.model.invoke(&prompt).await.map_err(failed("Flight search"))?;

        Ok(json!({
            "flight_info": info,
            "context_update": format!(
                "Flight search completed: {origin} to {destination}, {departure} - {}, {} passengers.",
                return_date.as_deref().unwrap_or("one-way"),
                passengers.as_deref().unwrap_or("1"),
            ),
            "next_steps": "Search for accommodations at the destination.",
        }))
    }
}

pub struct AccommodationSearch {
    model: Model,
}

#[async_trait]
impl Skill for AccommodationSearch {
    fn name(&self) -> &str {
        "accommodation_search"
    }

    fn description(&self) -> &str {
        "Search for hotels, accommodations, and lodging options with pricing and availability"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field("destination", FieldSpec::text("City or area for accommodation"))
            .field("check_in", FieldSpec::text("Check-in date (YYYY-MM-DD)"))
            .field("check_out", FieldSpec::text("Check-out date (YYYY-MM-DD)"))
            .field("guests", FieldSpec::number("Number of guests").optional())
            .field("budget", FieldSpec::number("Budget range or maximum per night").optional())
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let destination = inputs.require_text("destination")?;
        let check_in = inputs.require_text("check_in")?;
        let check_out = inputs.require_text("check_out")?;
        let guests = inputs.display("guests");
        let budget = inputs.display("budget");

        let prompt = prompts::accommodation_search(&prompts::AccommodationSearch {
            destination,
            check_in,
            check_out,
            guests: guests.as_deref(),
            budget: budget.as_deref(),
        });
        let info = self.model.invoke(&prompt).await.map_err(failed("Accommodation search"))?;

        Ok(json!({
            "accommodation_info": info,
            "context_update": format!(
                "Accommodation search completed for {destination}: {check_in} to {check_out}, {} guests, budget: {}.",
                guests.as_deref().unwrap_or("1"),
                budget.as_deref().unwrap_or("flexible"),
            ),
            "next_steps": "Plan activities and experiences for the destination.",
        }))
    }
}

pub struct ActivityPlanning {
    model: Model,
}

#[async_trait]
impl Skill for ActivityPlanning {
    fn name(&self) -> &str {
        "activity_planning"
    }

    fn description(&self) -> &str {
        "Research and plan activities, restaurants, experiences, and attractions for a destination"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field("destination", FieldSpec::text("Destination for activities"))
            .field("dates", FieldSpec::text("Travel dates for activity planning"))
            .field("interests", FieldSpec::array("Traveler interests and preferences").optional())
            .field("group_size", FieldSpec::number("Size of travel group").optional())
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let destination = inputs.require_text("destination")?;
        let dates = inputs.require_text("dates")?;
        let interests = inputs.display("interests");
        let group_size = inputs.display("group_size");

        let prompt = prompts::activity_planning(&prompts::ActivityPlanning {
            destination,
            dates,
            interests: interests.as_deref(),
            group_size: group_size.as_deref(),
        });
        let info = self.model.invoke(&prompt).await.map_err(failed("Activity planning"))?;

        Ok(json!({
            "activity_info": info,
            "context_update": format!(
                "Activity planning completed for {destination}: {dates}, interests: {}, group size: {}.",
                interests.as_deref().unwrap_or("general sightseeing"),
                group_size.as_deref().unwrap_or("1"),
            ),
            "next_steps": "Build a comprehensive day-by-day itinerary using all gathered information.",
        }))
    }
}

pub struct ItineraryBuilder {
    model: Model,
    store: Arc<dyn VectorStore>,
}

#[async_trait]
impl Skill for ItineraryBuilder {
    fn name(&self) -> &str {
        "itinerary_builder"
    }

    fn description(&self) -> &str {
        "Consolidate all travel information into a structured day-by-day itinerary with scheduling and logistics"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field("destination", FieldSpec::text("Trip destination"))
            .field("travel_dates", FieldSpec::text("Complete travel dates"))
            .field("preferences", FieldSpec::array("Traveler preferences and requirements").optional())
            .field("gathered_info", FieldSpec::text("All information gathered from previous agents"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        const PHASE: &str = "Itinerary building";
        let destination = inputs.require_text("destination")?;
        let travel_dates = inputs.require_text("travel_dates")?;
        let gathered_info = inputs.require_text("gathered_info")?;
        let preferences = inputs.display("preferences");

        let prompt = prompts::itinerary(&prompts::ItineraryBuild {
            destination,
            travel_dates,
            preferences: preferences.as_deref(),
            gathered_info,
        });
        let itinerary = self.model.invoke(&prompt).await.map_err(failed(PHASE))?;

        let trip_id = format!("itinerary_{}_{}", underscored(destination), now_millis());
        let doc = format!(
            "Trip ID: {trip_id}\nDestination: {destination}\nDates: {travel_dates}\nPreferences: {}\nCreated: {}\nItinerary: {itinerary}",
            preferences.as_deref().unwrap_or("None specified"),
            Utc::now().to_rfc3339(),
        );
        self.store.insert_doc(&trip_id, &doc).await.map_err(failed(PHASE))?;

        Ok(json!({
            "itinerary": itinerary,
            "trip_id": trip_id,
            "context_update": format!(
                "Complete itinerary created and saved for {destination} trip ({travel_dates}). Trip ID: {trip_id}"
            ),
            "next_steps": "Calculate detailed budget breakdown for the planned trip.",
        }))
    }
}

pub struct BudgetCalculator {
    model: Model,
    rates: RateTable,
}

#[async_trait]
impl Skill for BudgetCalculator {
    fn name(&self) -> &str {
        "budget_calculator"
    }

    fn description(&self) -> &str {
        "Calculate comprehensive trip costs including flights, accommodation, activities, meals, and miscellaneous expenses"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field("trip_details", FieldSpec::text("Summary of trip details and planned activities"))
            .field("duration", FieldSpec::number("Trip duration in days"))
            .field("group_size", FieldSpec::number("Number of travelers"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let trip_details = inputs.require_text("trip_details")?;
        let days = positive_count("duration", inputs.number("duration").unwrap_or(0.0))?;
        let people = positive_count("group_size", inputs.number("group_size").unwrap_or(0.0))?;
        let breakdown = compute_budget(days, people, &self.rates)?;

        let prompt = prompts::budget_report(&prompts::BudgetReport {
            trip_details,
            breakdown: &breakdown,
        });
        let report = self.model.invoke(&prompt).await.map_err(failed("Budget calculation"))?;

        Ok(json!({
            "budget_report": report,
            "budget_totals": {
                "budget": breakdown.budget.total,
                "mid_range": breakdown.mid_range.total,
                "luxury": breakdown.luxury.total,
                "duration_days": days,
                "group_size": people,
            },
            "context_update": format!(
                "Budget calculated: Budget (${}), Mid-range (${}), Luxury (${}) for {people} people, {days} days.",
                breakdown.budget.total, breakdown.mid_range.total, breakdown.luxury.total,
            ),
            "next_steps": "All major planning phases completed. Review and finalize trip details.",
        }))
    }
}

pub struct ContextManager {
    model: Model,
    store: Arc<dyn VectorStore>,
}

#[async_trait]
impl Skill for ContextManager {
    fn name(&self) -> &str {
        "context_manager"
    }

    fn description(&self) -> &str {
        "Maintain and update shared context across all planning phases, track completed tasks, and provide status updates"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field("context_data", FieldSpec::object("Current trip planning context").optional())
            .field("action", FieldSpec::text("Type of context action (update, summarize, analyze)"))
            .field("update_info", FieldSpec::text("New information to add to context"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        const PHASE: &str = "Context management";
        let action = inputs.require_text("action")?;
        let update_info = inputs.require_text("update_info")?;
        let context_data = inputs.display("context_data");

        let prompt = prompts::context_management(&prompts::ContextUpdate {
            action,
            context_data: context_data.as_deref(),
            update_info,
        });
        let summary = self.model.invoke(&prompt).await.map_err(failed(PHASE))?;

        let context_id = format!("context_{}", now_millis());
        let doc = format!(
            "Context Update: {}\nAction: {action}\nUpdate: {update_info}\nSummary: {summary}",
            Utc::now().to_rfc3339(),
        );
        self.store.insert_doc(&context_id, &doc).await.map_err(failed(PHASE))?;

        Ok(json!({
            "context_summary": summary,
            "planning_status": format!("Context updated with action: {action}"),
            "context_id": context_id,
        }))
    }
}

/// Similarity hits as `{content, similarity}`, in the order the store ranked them.
async fn ranked_hits(store: &dyn VectorStore, query: &str, top_k: usize) -> Result<Vec<Value>, SkillError> {
    Ok(store
        .search(query, top_k)
        .await?
        .into_iter()
        .map(|h| json!({ "content": h.content, "similarity": h.similarity }))
        .collect())
}

pub struct SearchTravelPlans {
    store: Arc<dyn VectorStore>,
}

#[async_trait]
impl Skill for SearchTravelPlans {
    fn name(&self) -> &str {
        "search_travel_plans"
    }

    fn description(&self) -> &str {
        "Search through saved travel plans and itineraries"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().field("query", FieldSpec::text("Search query for travel plans"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let query = inputs.require_text("query")?;
        let plans = ranked_hits(self.store.as_ref(), query, 5).await.map_err(failed("Search"))?;
        if plans.is_empty() {
            return Ok(Value::String(format!("No matching travel plans found for: \"{query}\"")));
        }
        Ok(json!({
            "message": format!("Found {} matching travel plans:", plans.len()),
            "plans": plans,
        }))
    }
}

pub struct GetDestinationInsights {
    store: Arc<dyn VectorStore>,
}

#[async_trait]
impl Skill for GetDestinationInsights {
    fn name(&self) -> &str {
        "get_destination_insights"
    }

    fn description(&self) -> &str {
        "Retrieve previously researched destination information"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().field("destination", FieldSpec::text("Destination name to look up"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let destination = inputs.require_text("destination")?;
        let insights = ranked_hits(self.store.as_ref(), destination, 3)
            .await
            .map_err(failed("Insights retrieval"))?;
        if insights.is_empty() {
            return Ok(Value::String(format!("No previous research found for: \"{destination}\"")));
        }
        Ok(json!({
            "message": format!("Found destination insights for {destination}:"),
            "insights": insights,
        }))
    }
}

/// All Trip Planner skills in registration order.
pub fn skills(model: Model, stores: TripStores, rates: RateTable) -> Vec<Arc<dyn Skill>> {
    vec![
        Arc::new(DestinationResearch {
            model: model.clone(),
            store: stores.destinations.clone(),
        }),
        Arc::new(FlightSearch { model: model.clone() }),
        Arc::new(AccommodationSearch { model: model.clone() }),
        Arc::new(ActivityPlanning { model: model.clone() }),
        Arc::new(ItineraryBuilder {
            model: model.clone(),
            store: stores.travel_plans.clone(),
        }),
        Arc::new(BudgetCalculator {
            model: model.clone(),
            rates,
        }),
        Arc::new(ContextManager {
            model,
            store: stores.trip_context,
        }),
        Arc::new(SearchTravelPlans {
            store: stores.travel_plans,
        }),
        Arc::new(GetDestinationInsights {
            store: stores.destinations,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedLlm, MemStore, hit, model};
    use skiff_core::skill::{SkillOutcome, SkillRegistry};

    struct Fixture {
        llm: Arc<CannedLlm>,
        destinations: Arc<MemStore>,
        travel_plans: Arc<MemStore>,
        trip_context: Arc<MemStore>,
        registry: SkillRegistry,
    }

    fn fixture_with(llm: Arc<CannedLlm>, destinations: Arc<MemStore>, travel_plans: Arc<MemStore>) -> Fixture {
        let trip_context = Arc::new(MemStore::default());
        let stores = TripStores {
            destinations: destinations.clone(),
            travel_plans: travel_plans.clone(),
            trip_context: trip_context.clone(),
        };
        let mut registry = SkillRegistry::new();
        for skill in skills(model(&llm), stores, RateTable::default()) {
            registry.register(skill).unwrap();
        }
        Fixture {
            llm,
            destinations,
            travel_plans,
            trip_context,
            registry,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            CannedLlm::replying("A lovely plan."),
            Arc::new(MemStore::default()),
            Arc::new(MemStore::default()),
        )
    }

    fn success(outcome: SkillOutcome) -> Value {
        match outcome {
            SkillOutcome::Success(v) => v,
            SkillOutcome::Failure(m) => panic!("unexpected failure: {m}"),
        }
    }

    #[test]
    fn registers_nine_skills_in_order() {
        let f = fixture();
        assert_eq!(
            f.registry.names(),
            vec![
                "destination_research",
                "flight_search",
                "accommodation_search",
                "activity_planning",
                "itinerary_builder",
                "budget_calculator",
                "context_manager",
                "search_travel_plans",
                "get_destination_insights",
            ]
        );
    }

    #[tokio::test]
    async fn destination_research_stores_and_reports() {
        let f = fixture();
        let value = success(
            f.registry
                .invoke("destination_research", &json!({"destination": "New York City"}))
                .await,
        );
        assert_eq!(value["destination_info"], "A lovely plan.");
        assert!(value["context_update"].as_str().unwrap().contains("New York City"));

        let prompt = &f.llm.prompts()[0];
        assert_eq!(prompt.matches("Not specified").count(), 2);

        let inserts = f.destinations.inserts();
        assert!(inserts[0].0.starts_with("dest_New_York_City_"));
        assert!(inserts[0].1.contains("Research: A lovely plan."));
        assert!(inserts[0].1.contains("Interests: General"));
    }

    #[tokio::test]
    async fn interests_array_rendered_as_list() {
        let f = fixture();
        f.registry
            .invoke(
                "destination_research",
                &json!({"destination": "Rome", "travel_dates": "May", "interests": ["history", "food"]}),
            )
            .await;
        assert!(f.llm.prompts()[0].contains("Traveler interests: history, food"));
    }

    #[tokio::test]
    async fn flight_search_context_mentions_defaults() {
        let f = fixture();
        let value = success(
            f.registry
                .invoke(
                    "flight_search",
                    &json!({"origin": "JFK", "destination": "CDG", "departure_date": "2025-06-01"}),
                )
                .await,
        );
        assert_eq!(
            value["context_update"],
            "Flight search completed: JFK to CDG, 2025-06-01 - one-way, 1 passengers."
        );
    }

    #[tokio::test]
    async fn accommodation_guests_from_numeric_string() {
        let f = fixture();
        success(
            f.registry
                .invoke(
                    "accommodation_search",
                    &json!({"destination": "Lisbon", "check_in": "a", "check_out": "b", "guests": "2"}),
                )
                .await,
        );
        assert!(f.llm.prompts()[0].contains("Guests: 2"));
    }

    #[tokio::test]
    async fn activity_planning_requires_dates() {
        let f = fixture();
        let outcome = f.registry.invoke("activity_planning", &json!({"destination": "Rome"})).await;
        assert!(matches!(outcome, SkillOutcome::Failure(ref m) if m.contains("dates")));
    }

    #[tokio::test]
    async fn itinerary_is_saved_with_trip_id() {
        let f = fixture();
        let value = success(
            f.registry
                .invoke(
                    "itinerary_builder",
                    &json!({"destination": "Paris", "travel_dates": "June 1-7", "gathered_info": "all of it"}),
                )
                .await,
        );
        let trip_id = value["trip_id"].as_str().unwrap();
        assert!(trip_id.starts_with("itinerary_Paris_"));
        assert_eq!(f.travel_plans.inserts()[0].0, trip_id);
        assert!(f.llm.prompts()[0].contains("Preferences: None specified"));
    }

    #[tokio::test]
    async fn budget_calculator_totals() {
        let f = fixture();
        let value = success(
            f.registry
                .invoke(
                    "budget_calculator",
                    &json!({"trip_details": "Paris week", "duration": 7, "group_size": 2}),
                )
                .await,
        );
        assert_eq!(
            value["budget_totals"],
            json!({"budget": 2590, "mid_range": 4130, "luxury": 7700, "duration_days": 7, "group_size": 2})
        );
        assert!(f.llm.prompts()[0].contains("$2590"));
    }

    #[tokio::test]
    async fn budget_calculator_rejects_non_positive() {
        let f = fixture();
        for (duration, group) in [(0, 2), (-3, 2), (7, 0)] {
            let outcome = f
                .registry
                .invoke(
                    "budget_calculator",
                    &json!({"trip_details": "x", "duration": duration, "group_size": group}),
                )
                .await;
            assert!(matches!(outcome, SkillOutcome::Failure(ref m) if m.starts_with("Invalid argument")));
        }
        assert!(f.llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn context_manager_snapshots_context() {
        let f = fixture();
        let value = success(
            f.registry
                .invoke(
                    "context_manager",
                    &json!({"action": "update", "update_info": "Flights chosen", "context_data": {"destination": "Oslo"}}),
                )
                .await,
        );
        assert_eq!(value["planning_status"], "Context updated with action: update");
        assert!(value["context_id"].as_str().unwrap().starts_with("context_"));
        assert!(f.llm.prompts()[0].contains(r#"Current Context: {"destination":"Oslo"}"#));
        assert_eq!(f.trip_context.inserts().len(), 1);
    }

    #[tokio::test]
    async fn llm_failure_names_phase() {
        let f = fixture_with(
            CannedLlm::failing(),
            Arc::new(MemStore::default()),
            Arc::new(MemStore::default()),
        );
        let outcome = f.registry.invoke("destination_research", &json!({"destination": "Lima"})).await;
        assert!(matches!(outcome, SkillOutcome::Failure(ref m) if m.starts_with("Destination research failed:")));
        assert!(f.destinations.inserts().is_empty());
    }

    #[tokio::test]
    async fn store_failure_names_phase() {
        let broken = Arc::new(MemStore {
            fail: true,
            ..MemStore::default()
        });
        let f = fixture_with(CannedLlm::replying("ok"), Arc::new(MemStore::default()), broken);
        let outcome = f
            .registry
            .invoke(
                "itinerary_builder",
                &json!({"destination": "Lima", "travel_dates": "x", "gathered_info": "y"}),
            )
            .await;
        assert!(matches!(outcome, SkillOutcome::Failure(ref m) if m.starts_with("Itinerary building failed:")));
    }

    #[tokio::test]
    async fn search_plans_preserves_store_order() {
        let plans = MemStore::with_hits(vec![hit("p2", "Lisbon plan", 0.3), hit("p1", "Porto plan", 0.8)]);
        let f = fixture_with(CannedLlm::replying("-"), Arc::new(MemStore::default()), plans);

        let value = success(f.registry.invoke("search_travel_plans", &json!({"query": "portugal"})).await);
        assert_eq!(value["message"], "Found 2 matching travel plans:");
        assert_eq!(value["plans"][0]["content"], "Lisbon plan");
        assert_eq!(value["plans"][1]["content"], "Porto plan");
        assert_eq!(f.travel_plans.searches.lock().unwrap()[0].1, 5);
    }

    #[tokio::test]
    async fn insights_empty_is_plain_message() {
        let f = fixture();
        let value = success(f.registry.invoke("get_destination_insights", &json!({"destination": "Oslo"})).await);
        assert_eq!(value, json!("No previous research found for: \"Oslo\""));
        assert_eq!(f.destinations.searches.lock().unwrap()[0], ("Oslo".to_string(), 3));
    }
}
