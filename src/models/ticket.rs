// Purchase tickets and per-customer baskets

use crate::error::SimulationError;
use crate::models::{ArticleId, Cell, CustomerId, StoreGrid, TicketId};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

/// One line of a purchase ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketLine {
    /// Time the customer entered the store
    pub entered_at: NaiveDateTime,
    pub customer_id: CustomerId,
    pub article_id: ArticleId,
    pub quantity: u32,
    pub ticket_id: TicketId,
}

/// Everything one customer bought, aggregated over their ticket lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerBasket {
    pub customer_id: CustomerId,

    /// First ticket seen for this customer
    pub ticket_id: TicketId,

    /// Earliest entry time over the customer's lines
    pub entered_at: NaiveDateTime,

    /// Article id -> purchased quantity
    pub items: BTreeMap<ArticleId, u32>,
}

impl CustomerBasket {
    /// Creates an empty basket from the customer's first ticket line
    pub fn new<C, T>(customer_id: C, ticket_id: T, entered_at: NaiveDateTime) -> Self
    where
        C: Into<CustomerId>,
        T: Into<TicketId>,
    {
        Self {
            customer_id: customer_id.into(),
            ticket_id: ticket_id.into(),
            entered_at,
            items: BTreeMap::new(),
        }
    }

    /// Adds an item; repeated articles accumulate, zero quantities are ignored
    pub fn add_item<S: Into<ArticleId>>(&mut self, article_id: S, quantity: u32) {
        if quantity > 0 {
            let total = self.items.entry(article_id.into()).or_insert(0);
            *total = total.saturating_add(quantity);
        }
    }

    /// Gets the total number of units (including quantities)
    pub fn total_quantity(&self) -> u32 {
        self.items.values().fold(0, |sum, &qty| sum.saturating_add(qty))
    }

    pub fn unique_article_count(&self) -> usize {
        self.items.len()
    }

    /// Groups purchased articles by pickup cell.
    ///
    /// Articles sharing a pickup cell collapse into a single stop. Fails with
    /// `LayoutInconsistency` for an article the planogram does not place.
    pub fn pickup_stops(
        &self,
        grid: &StoreGrid,
    ) -> Result<BTreeMap<Cell, Vec<ArticleId>>, SimulationError> {
        let mut stops: BTreeMap<Cell, Vec<ArticleId>> = BTreeMap::new();
        for article in self.items.keys() {
            let cell = grid
                .pickup_cell(article)
                .ok_or_else(|| SimulationError::LayoutInconsistency {
                    customer: self.customer_id.clone(),
                    article: article.clone(),
                })?;
            stops.entry(cell).or_default().push(article.clone());
        }
        Ok(stops)
    }
}

/// Groups ticket lines into one basket per customer, in first-appearance order
pub fn group_baskets(lines: &[TicketLine]) -> Vec<CustomerBasket> {
    let mut baskets: Vec<CustomerBasket> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for line in lines {
        let idx = *position.entry(line.customer_id.as_str()).or_insert_with(|| {
            baskets.push(CustomerBasket::new(
                line.customer_id.clone(),
                line.ticket_id.clone(),
                line.entered_at,
            ));
            baskets.len() - 1
        });

        let basket = &mut baskets[idx];
        basket.entered_at = basket.entered_at.min(line.entered_at);
        basket.add_item(line.article_id.clone(), line.quantity);
    }

    baskets
}
