use crate::contract::{ContextHandle, ProfiledSort, SortAxis, SortProfile};
use crate::error::Result;
use crate::namespace::{ConstructResult, Namespace};

const CATEGORY: &str = "Exchange Sorts";

pub(super) fn register(namespace: &mut Namespace) -> Result<()> {
    namespace.register("sorts.exchange.BubbleSort", bubble)?;
    namespace.register("sorts.exchange.CocktailShakerSort", cocktail_shaker)?;
    namespace.register("sorts.exchange.QuickSort", quick)?;
    namespace.register_nested("sorts.exchange.QuickSort", "Partition", None)?;
    Ok(())
}

fn bubble(ctx: ContextHandle) -> ConstructResult {
    Ok(Box::new(ProfiledSort::new(
        ctx,
        SortProfile::new("Bubble", "Bubble Sort", "Bubble sort", CATEGORY, SortAxis::Comparison),
    )))
}

fn cocktail_shaker(ctx: ContextHandle) -> ConstructResult {
    Ok(Box::new(ProfiledSort::new(
        ctx,
        SortProfile::new(
            "Cocktail Shaker",
            "Cocktail Shaker Sort",
            "Cocktail shaker sort",
            CATEGORY,
            SortAxis::Comparison,
        ),
    )))
}

fn quick(ctx: ContextHandle) -> ConstructResult {
    Ok(Box::new(ProfiledSort::new(
        ctx,
        SortProfile::new(
            "Quick (Left/Right Pointers)",
            "Quick Sort",
            "Quicksort",
            CATEGORY,
            SortAxis::Comparison,
        ),
    )))
}
