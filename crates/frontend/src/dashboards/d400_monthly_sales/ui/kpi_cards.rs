use contracts::dashboards::d400_monthly_sales::{KpiCard, KpiTone};
use leptos::prelude::*;

fn tone_class(tone: KpiTone) -> &'static str {
    match tone {
        KpiTone::Positive => "d400-kpi__value d400-kpi__value--positive",
        KpiTone::Negative => "d400-kpi__value d400-kpi__value--negative",
        KpiTone::Neutral => "d400-kpi__value",
    }
}

/// Row of four summary cards.
#[component]
pub fn KpiCards(cards: Vec<KpiCard>) -> impl IntoView {
    view! {
        <div class="d400-kpis" role="list">
            {cards
                .into_iter()
                .map(|card| {
                    let value_class = tone_class(card.tone);
                    view! {
                        <div class="d400-kpi" role="listitem" id=format!("d400-kpi-{}", card.id)>
                            <div class="d400-kpi__label">{card.label}</div>
                            <div class=value_class>
                                {card.value_text}
                                {card.badge_text.map(|badge| view! {
                                    <span class="d400-kpi__badge">{badge}</span>
                                })}
                            </div>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}
