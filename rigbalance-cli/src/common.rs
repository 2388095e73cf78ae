use async_trait::async_trait;
use erased_serde::Serializer;
use rigbalance::MemoryCatalog;

pub type Advisor = rigbalance::engine::Advisor<MemoryCatalog>;

#[async_trait]
pub trait Run {
    async fn run(
        &self,
        advisor: &Advisor,
        serializer: &mut (dyn Serializer + Send),
    ) -> anyhow::Result<()>;
}

#[macro_export]
macro_rules! run_impl_enum {
    ($i:ident, $self:ident, $advisor:ident, $ser:ident, $b:block) => {
        #[async_trait::async_trait]
        impl $crate::common::Run for $i {
            async fn run(
                &$self,
                $advisor: &$crate::common::Advisor,
                $ser: &mut (dyn erased_serde::Serializer + Send),
            ) -> anyhow::Result<()> {
                $b;
                Ok(())
            }
        }
    };
}

#[macro_export]
macro_rules! run_impl_struct {
    ($i:ident, $self:ident, $advisor:ident, $b:block) => {
        #[async_trait::async_trait]
        impl $crate::common::Run for $i {
            async fn run(
                &$self,
                $advisor: &$crate::common::Advisor,
                serializer: &mut (dyn erased_serde::Serializer + Send),
            ) -> anyhow::Result<()> {
                erased_serde::serialize(&$b, serializer)?;
                Ok(())
            }
        }
    };
}
