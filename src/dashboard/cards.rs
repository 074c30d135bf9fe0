//! Card components for the dashboard summary.

use maud::{Markup, html};

use crate::html::format_currency;

/// Renders the month to date spending total as a summary card.
///
/// # Arguments
/// * `monthly_total` - The sum of all amounts recorded this month
///
/// # Returns
/// Maud markup containing the summary card section.
pub(super) fn monthly_total_card(monthly_total: f64) -> Markup {
    html! {
        section class="w-full mx-auto mb-4" {
            div class="flex justify-between items-baseline mb-4" {
                h3 class="text-xl font-semibold" {
                    "Spent This Month"
                }
                span class="text-sm text-gray-600 dark:text-gray-400" {
                    "Month to date"
                }
            }

            div
                class="bg-white dark:bg-gray-800 border border-gray-200
                       dark:border-gray-700 rounded-lg p-4 shadow-md"
                aria-label=(format!("Total spent this month: {}", format_currency(monthly_total)))
            {
                div id="monthly-total" class="text-3xl font-bold" {
                    (format_currency(monthly_total))
                }
            }
        }
    }
}
