use crate::contract::{ContextHandle, ProfiledSort, SortAlgorithm, SortAxis, SortProfile};
use crate::error::Result;
use crate::namespace::{ConstructResult, Namespace};

const CATEGORY: &str = "Distribution Sorts";

/// Longest array a bogosort is allowed to shuffle without a warning
const BOGO_LIMIT: u64 = 10;

pub(super) fn register(namespace: &mut Namespace) -> Result<()> {
    namespace.register("sorts.distribute.CountingSort", counting)?;
    namespace.register("sorts.distribute.LsdRadixSort", lsd_radix)?;
    namespace.register("sorts.distribute.BogoSort", bogo)?;
    Ok(())
}

fn counting(ctx: ContextHandle) -> ConstructResult {
    Ok(Box::new(ProfiledSort::new(
        ctx,
        SortProfile::new("Counting", "Counting Sort", "Counting sort", CATEGORY, SortAxis::Distribution),
    )))
}

fn lsd_radix(ctx: ContextHandle) -> ConstructResult {
    Ok(Box::new(ProfiledSort::new(
        ctx,
        SortProfile::new(
            "Least Significant Digit Radix",
            "Radix LSD Sort (Base 4)",
            "Least significant digit radix sort",
            CATEGORY,
            SortAxis::Distribution,
        )
        .with_radix()
        .with_buckets(),
    )))
}

fn bogo(ctx: ContextHandle) -> ConstructResult {
    Ok(Box::new(BogoSort::new(ctx)))
}

/// Bogosort; the warning limit never exceeds the visualizer's array capacity
struct BogoSort {
    profile: SortProfile,
    context: ContextHandle,
}

impl BogoSort {
    fn new(context: ContextHandle) -> Self {
        let limit = BOGO_LIMIT.min(context.max_array_length as u64).max(1);
        Self {
            profile: SortProfile::new("Bogo", "Bogo Sort", "Bogosort", CATEGORY, SortAxis::Distribution)
                .with_bogo()
                .with_unreasonable_limit(limit),
            context,
        }
    }
}

impl SortAlgorithm for BogoSort {
    fn profile(&self) -> &SortProfile {
        &self.profile
    }

    fn context(&self) -> &ContextHandle {
        &self.context
    }
}
