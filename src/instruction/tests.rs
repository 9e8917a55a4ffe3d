//! Instruction Module Tests
//!
//! ## Test Scopes
//! - **Closure instructions**: `from_fn` runs the closure with the executing member.
//! - **Registry**: Registration, lookup, payload handling and unknown names.
//! - **Factories**: Dependencies captured at registration reach the built instruction.

#[cfg(test)]
mod tests {
    use crate::instruction::registry::InstructionRegistry;
    use crate::instruction::types::{Instruction, from_fn};
    use crate::membership::types::Member;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Double(u32);

    #[async_trait]
    impl Instruction for Double {
        type Output = u32;

        async fn execute(&self, _member: &Member) -> anyhow::Result<u32> {
            Ok(self.0 * 2)
        }
    }

    // ============================================================
    // TEST 1: Instruction implementations
    // ============================================================

    #[tokio::test]
    async fn test_struct_instruction_executes() {
        let instruction = Double(21);

        let result = instruction.execute(&Member::named("a")).await.unwrap();

        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_from_fn_receives_executing_member() {
        let instruction = from_fn(|member: Member| async move { Ok(member.id().to_uppercase()) });

        let result = instruction.execute(&Member::named("node-x")).await.unwrap();

        assert_eq!(result, "NODE-X");
    }

    #[tokio::test]
    async fn test_from_fn_propagates_error() {
        let instruction = from_fn(|_member: Member| async move {
            Err::<(), _>(anyhow::anyhow!("Intentional error"))
        });

        let result = instruction.execute(&Member::local()).await;

        assert!(result.unwrap_err().to_string().contains("Intentional error"));
    }

    #[tokio::test]
    async fn test_shared_instruction_runs_many_times() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let instruction = from_fn(move |_member: Member| {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        for i in 0..3 {
            instruction
                .execute(&Member::named(format!("n{}", i)))
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    // ============================================================
    // TEST 2: InstructionRegistry
    // ============================================================

    #[tokio::test]
    async fn test_registry_register_and_build() {
        // ARRANGE
        let registry = InstructionRegistry::new();
        registry.register("echo", |payload: Value| {
            Ok(from_fn(move |_member: Member| {
                let payload = payload.clone();
                async move { Ok(payload) }
            }))
        });

        // ASSERT: registered
        assert!(registry.has_instruction("echo"));
        assert_eq!(registry.instruction_count(), 1);
        assert_eq!(registry.list_instructions(), vec!["echo".to_string()]);

        // ACT
        let instruction = registry.build("echo", json!({"book_id": "123"})).unwrap();
        let result = instruction.execute(&Member::local()).await.unwrap();

        // ASSERT
        assert_eq!(result["book_id"], "123");
    }

    #[test]
    fn test_registry_unknown_instruction_returns_error() {
        let registry = InstructionRegistry::new();

        let result = registry.build("non_existent", json!({}));

        assert!(result.is_err());
        assert!(
            result
                .err()
                .unwrap()
                .to_string()
                .contains("Unknown instruction")
        );
    }

    #[test]
    fn test_registry_factory_can_reject_payload() {
        let registry = InstructionRegistry::new();
        registry.register("needs_count", |payload: Value| {
            let count = payload["count"]
                .as_u64()
                .ok_or_else(|| anyhow::anyhow!("missing count"))?;
            Ok(from_fn(move |_member: Member| async move { Ok(json!(count)) }))
        });

        assert!(registry.build("needs_count", json!({})).is_err());
        assert!(registry.build("needs_count", json!({"count": 3})).is_ok());
    }

    #[tokio::test]
    async fn test_registry_factory_captures_dependencies() {
        // ARRANGE: a service the instruction needs, wired in at registration time
        let counter = Arc::new(AtomicUsize::new(10));
        let registry = InstructionRegistry::new();
        let service = counter.clone();
        registry.register("increment", move |_payload: Value| {
            let service = service.clone();
            Ok(from_fn(move |_member: Member| {
                let service = service.clone();
                async move { Ok(json!(service.fetch_add(1, Ordering::SeqCst) + 1)) }
            }))
        });

        // ACT
        let instruction = registry.build("increment", Value::Null).unwrap();
        let result = instruction.execute(&Member::local()).await.unwrap();

        // ASSERT
        assert_eq!(result, json!(11));
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_registry_register_replaces() {
        let registry = InstructionRegistry::new();
        registry.register("x", |_| Ok(from_fn(|_m: Member| async { Ok(json!(1)) })));
        registry.register("x", |_| Ok(from_fn(|_m: Member| async { Ok(json!(2)) })));

        assert_eq!(registry.instruction_count(), 1);
    }
}
