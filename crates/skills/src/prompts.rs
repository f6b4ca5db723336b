//! Prompt templates for the trip-planning skills.
//!
//! Each builder is pure: typed fields in, prompt text out. Unset optional
//! fields are replaced by a readable placeholder.

use crate::budget::BudgetBreakdown;

const DESTINATION_SECTIONS: &[&str] = &[
    "Overview and highlights",
    "Best time to visit and weather considerations",
    "Top attractions and must-see places",
    "Cultural considerations and local customs",
    "Transportation options within the destination",
    "Safety information and travel advisories",
    "Visa requirements and entry information",
    "Local cuisine highlights",
    "Shopping and entertainment districts",
    "Estimated daily budget ranges for different travel styles",
];

const FLIGHT_SECTIONS: &[&str] = &[
    "Available flight options with approximate pricing ranges",
    "Recommended airlines and typical routes",
    "Flight duration and connection considerations",
    "Best booking strategies and optimal timing",
    "Airport information and transportation to/from airports",
    "Baggage policies and restrictions",
    "Travel time considerations and jet lag tips",
    "Alternative airport options to consider",
    "Peak vs off-peak pricing patterns",
    "Tips for finding deals and using points/miles",
];

const ACCOMMODATION_SECTIONS: &[&str] = &[
    "Hotel categories and price ranges (budget/mid-range/luxury)",
    "Recommended neighborhoods and areas to stay",
    "Top-rated accommodations by category",
    "Alternative lodging options (Airbnb, hostels, boutique hotels)",
    "Booking platforms and strategies for best deals",
    "Amenities and features to prioritize",
    "Location considerations (proximity to attractions/transport)",
    "Safety and security considerations",
    "Cancellation policies and booking flexibility",
    "Seasonal pricing variations and booking timing",
];

const ACTIVITY_SECTIONS: &[&str] = &[
    "Top attractions and must-do activities with timing",
    "Restaurant recommendations by cuisine and budget level",
    "Cultural experiences and local events during travel dates",
    "Outdoor activities, tours, and adventure options",
    "Entertainment and nightlife recommendations",
    "Family-friendly activities if applicable",
    "Hidden gems and local favorites",
    "Seasonal activities and weather considerations",
    "Advance booking requirements and ticket information",
    "Estimated costs and duration for each activity",
    "Alternative indoor options for bad weather",
    "Photography spots and Instagram-worthy locations",
];

const ITINERARY_SECTIONS: &[&str] = &[
    "Daily schedule with realistic time blocks and transitions",
    "Morning, afternoon, and evening activities",
    "Restaurant recommendations for each meal",
    "Transportation details between locations",
    "Practical tips and important reminders",
    "Backup options for weather or closures",
    "Cost estimates for each day's activities",
    "Contact information and addresses",
    "Suggested packing items for specific activities",
    "Cultural etiquette reminders for specific activities",
];

const BUDGET_SECTIONS: &[&str] = &[
    "Cost breakdown by category (accommodation, meals, activities, transport, misc)",
    "Daily spending estimates for each budget tier",
    "Money-saving tips and strategies",
    "Payment methods and currency considerations",
    "Contingency fund recommendations (suggest 15-20% buffer)",
    "Cost comparison between budget tiers",
    "Tips for tracking expenses during travel",
    "Seasonal pricing considerations",
    "Group discounts and savings opportunities",
    "Emergency fund recommendations",
];

const CONTEXT_SECTIONS: &[&str] = &[
    "Updated consolidated context summary",
    "List of completed planning phases",
    "Remaining tasks and next steps",
    "Key decisions that still need to be made",
    "Information gaps that need to be filled",
    "Recommendations for optimizing the planning process",
    "Priority actions for the user",
    "Status of each planning component (destination, flights, hotels, activities, itinerary, budget)",
    "Important deadlines or time-sensitive tasks",
    "Overall trip planning progress percentage",
];

pub struct DestinationResearch<'a> {
    pub destination: &'a str,
    pub travel_dates: Option<&'a str>,
    pub interests: Option<&'a str>,
}

pub struct FlightSearch<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub departure_date: &'a str,
    pub return_date: Option<&'a str>,
    pub passengers: Option<&'a str>,
}

pub struct AccommodationSearch<'a> {
    pub destination: &'a str,
    pub check_in: &'a str,
    pub check_out: &'a str,
    pub guests: Option<&'a str>,
    pub budget: Option<&'a str>,
}

pub struct ActivityPlanning<'a> {
    pub destination: &'a str,
    pub dates: &'a str,
    pub interests: Option<&'a str>,
    pub group_size: Option<&'a str>,
}

pub struct ItineraryBuild<'a> {
    pub destination: &'a str,
    pub travel_dates: &'a str,
    pub preferences: Option<&'a str>,
    pub gathered_info: &'a str,
}

pub struct BudgetReport<'a> {
    pub trip_details: &'a str,
    pub breakdown: &'a BudgetBreakdown,
}

pub struct ContextUpdate<'a> {
    pub action: &'a str,
    pub context_data: Option<&'a str>,
    pub update_info: &'a str,
}

fn numbered(sections: &[&str]) -> String {
    sections
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {s}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn destination_research(req: &DestinationResearch<'_>) -> String {
    format!(
        "Provide comprehensive destination research for: {destination}\n\
         Travel dates: {dates}\n\
         Traveler interests: {interests}\n\n\
         Include detailed information about:\n\
         {sections}\n\n\
         Format as a structured, comprehensive destination guide.",
        destination = req.destination,
        dates = req.travel_dates.unwrap_or("Not specified"),
        interests = req.interests.unwrap_or("Not specified"),
        sections = numbered(DESTINATION_SECTIONS),
    )
}

pub fn flight_search(req: &FlightSearch<'_>) -> String {
    format!(
        "Analyze flight options from {origin} to {destination}:\n\
         Departure: {departure}\n\
         Return: {ret}\n\
         Passengers: {passengers}\n\n\
         Provide comprehensive flight information:\n\
         {sections}\n\n\
         Note: Recommend using flight comparison sites like Kayak, Google Flights, or Expedia for real-time pricing.",
        origin = req.origin,
        destination = req.destination,
        departure = req.departure_date,
        ret = req.return_date.unwrap_or("One-way"),
        passengers = req.passengers.unwrap_or("1"),
        sections = numbered(FLIGHT_SECTIONS),
    )
}

pub fn accommodation_search(req: &AccommodationSearch<'_>) -> String {
    format!(
        "Find accommodation recommendations for:\n\
         Location: {destination}\n\
         Check-in: {check_in}\n\
         Check-out: {check_out}\n\
         Guests: {guests}\n\
         Budget: {budget}\n\n\
         Provide comprehensive lodging information:\n\
         {sections}\n\n\
         Note: Recommend using Booking.com, Airbnb, Hotels.com for real-time availability and pricing.",
        destination = req.destination,
        check_in = req.check_in,
        check_out = req.check_out,
        guests = req.guests.unwrap_or("1"),
        budget = req.budget.unwrap_or("Flexible"),
        sections = numbered(ACCOMMODATION_SECTIONS),
    )
}

pub fn activity_planning(req: &ActivityPlanning<'_>) -> String {
    format!(
        "Plan comprehensive activities and experiences for:\n\
         Destination: {destination}\n\
         Dates: {dates}\n\
         Interests: {interests}\n\
         Group Size: {group}\n\n\
         Create detailed activity recommendations:\n\
         {sections}\n\n\
         Organize by priority and group activities by location/area for efficient planning.",
        destination = req.destination,
        dates = req.dates,
        interests = req.interests.unwrap_or("General sightseeing"),
        group = req.group_size.unwrap_or("1"),
        sections = numbered(ACTIVITY_SECTIONS),
    )
}

pub fn itinerary(req: &ItineraryBuild<'_>) -> String {
    format!(
        "Create a comprehensive day-by-day itinerary using all gathered information:\n\n\
         Destination: {destination}\n\
         Travel Dates: {dates}\n\
         Preferences: {preferences}\n\n\
         All Gathered Information:\n\
         {gathered}\n\n\
         Structure the itinerary with:\n\
         {sections}\n\n\
         Ensure logical flow, realistic timing, and account for travel time between locations.\n\
         Format as a clear, day-by-day guide that can be easily followed.",
        destination = req.destination,
        dates = req.travel_dates,
        preferences = req.preferences.unwrap_or("None specified"),
        gathered = req.gathered_info,
        sections = numbered(ITINERARY_SECTIONS),
    )
}

pub fn budget_report(req: &BudgetReport<'_>) -> String {
    let b = req.breakdown;
    let totals = b
        .tiers()
        .iter()
        .map(|t| format!("- {} Option: ${} (${}/person/day)", t.name, t.total, t.daily_rate))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a comprehensive budget breakdown report:\n\n\
         Trip Details: {details}\n\
         Duration: {days} days\n\
         Group Size: {people} people\n\n\
         Calculated Totals:\n\
         {totals}\n\n\
         Provide detailed analysis including:\n\
         {sections}\n\n\
         Format as a clear, actionable budget guide with specific dollar amounts.",
        details = req.trip_details,
        days = b.days,
        people = b.people,
        sections = numbered(BUDGET_SECTIONS),
    )
}

pub fn context_management(req: &ContextUpdate<'_>) -> String {
    format!(
        "Manage the shared context for this trip planning session:\n\n\
         Action: {action}\n\
         Current Context: {context}\n\
         New Information: {update}\n\n\
         Provide comprehensive context management:\n\
         {sections}\n\n\
         Maintain awareness of all gathered information and provide strategic guidance.",
        action = req.action,
        context = req.context_data.unwrap_or("New session"),
        update = req.update_info,
        sections = numbered(CONTEXT_SECTIONS),
    )
}
