//! End-to-end tests for the context facade.

use std::sync::{Arc, Mutex};

use relmodel::{
    AttributeDef, ChangeHooks, Context, DeleteBehavior, EntityDescriptor, EntityId,
    EntityInstance, Error, ModelBuilder, NavigationDef, RelationshipModel, ScalarType, SyncError,
    Value,
};

fn staff_model(employee_slot: NavigationDef) -> RelationshipModel {
    ModelBuilder::new()
        .with_entity(
            EntityDescriptor::new("Department", "DeptId")
                .with_attribute(AttributeDef::new("DeptId", ScalarType::String))
                .with_navigation(NavigationDef::collection("employees", "Employee")),
        )
        .with_entity(
            EntityDescriptor::new("Employee", "Id")
                .with_attribute(AttributeDef::new("Id", ScalarType::String))
                .with_navigation(employee_slot),
        )
        .build()
        .unwrap()
}

fn department(key: &str) -> EntityInstance {
    EntityInstance::new("Department", EntityId::generate()).with_attribute("DeptId", key)
}

fn employee(key: &str) -> EntityInstance {
    EntityInstance::new("Employee", EntityId::generate()).with_attribute("Id", key)
}

#[test]
fn linking_keeps_foreign_key_in_sync() {
    let ctx = Context::new(staff_model(NavigationDef::single("department", "Department")));
    let d1 = ctx.attach(department("D1")).unwrap();
    let d2 = ctx.attach(department("D2")).unwrap();
    let emp = ctx.attach(employee("E1")).unwrap();

    ctx.set_single(emp, "department", Some(d1)).unwrap();
    assert_eq!(
        ctx.get(emp).unwrap().attribute("DepartmentDeptId"),
        Some(&Value::String("D1".into()))
    );

    ctx.set_single(emp, "department", Some(d2)).unwrap();
    assert_eq!(
        ctx.get(emp).unwrap().attribute("DepartmentDeptId"),
        Some(&Value::String("D2".into()))
    );
    assert!(ctx.collection(d1, "employees").unwrap().is_empty());

    ctx.set_single(emp, "department", None).unwrap();
    assert!(ctx.get(emp).unwrap().attribute("DepartmentDeptId").unwrap().is_null());
}

#[test]
fn restricted_delete_reports_and_rolls_back() {
    let ctx = Context::new(staff_model(
        NavigationDef::single("department", "Department").with_on_delete(DeleteBehavior::Restrict),
    ));
    let dept = ctx.attach(department("D1")).unwrap();
    let emp = ctx.attach(employee("E1")).unwrap();
    ctx.add_to_collection(dept, "employees", emp).unwrap();

    let err = ctx.delete(dept).unwrap_err();
    assert!(matches!(
        err,
        Error::Sync(SyncError::DeleteRestricted { count: 1, .. })
    ));

    assert!(ctx.contains(dept));
    assert!(ctx.contains(emp));
    assert_eq!(ctx.single(emp, "department").unwrap(), Some(dept));
}

#[test]
fn cascade_delete_removes_dependents() {
    let ctx = Context::new(staff_model(
        NavigationDef::single("department", "Department").with_on_delete(DeleteBehavior::Cascade),
    ));
    let dept = ctx.attach(department("D1")).unwrap();
    let e1 = ctx.attach(employee("E1")).unwrap();
    let e2 = ctx.attach(employee("E2")).unwrap();
    ctx.add_to_collection(dept, "employees", e1).unwrap();
    ctx.add_to_collection(dept, "employees", e2).unwrap();

    ctx.delete(dept).unwrap();

    assert!(ctx.is_empty());
}

/// Collects linked/unlinked pairs the way a change tracker would.
#[derive(Default, Clone)]
struct PendingChanges {
    events: Arc<Mutex<Vec<(String, String)>>>,
}

impl PendingChanges {
    fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }
}

impl ChangeHooks for PendingChanges {
    fn on_attach(&self, entity: &EntityInstance) {
        self.events
            .lock()
            .unwrap()
            .push(("attach".into(), entity.entity_type.clone()));
    }

    fn on_link(&self, relationship: &str, _principal: EntityId, _dependent: EntityId) {
        self.events
            .lock()
            .unwrap()
            .push(("link".into(), relationship.to_string()));
    }

    fn on_unlink(&self, relationship: &str, _principal: EntityId, _dependent: EntityId) {
        self.events
            .lock()
            .unwrap()
            .push(("unlink".into(), relationship.to_string()));
    }

    fn on_delete(&self, entity: &EntityInstance) {
        self.events
            .lock()
            .unwrap()
            .push(("delete".into(), entity.entity_type.clone()));
    }
}

#[test]
fn change_hooks_observe_every_mutation() {
    let tracker = PendingChanges::default();
    let mut ctx = Context::new(staff_model(
        NavigationDef::single("department", "Department").with_on_delete(DeleteBehavior::Cascade),
    ));
    ctx.register_hooks(Box::new(tracker.clone()));

    let dept = ctx.attach(department("D1")).unwrap();
    let emp = ctx.attach(employee("E1")).unwrap();
    ctx.add_to_collection(dept, "employees", emp).unwrap();
    ctx.delete(dept).unwrap();

    let kinds: Vec<String> = tracker.events().into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec!["attach", "attach", "link", "delete", "delete"]);

    // Failed operations fire no hooks.
    let before = tracker.events().len();
    assert!(ctx.delete(EntityId::generate()).is_err());
    assert_eq!(tracker.events().len(), before);
}

#[test]
fn contexts_share_one_model() {
    let model = Arc::new(staff_model(NavigationDef::single("department", "Department")));
    let fingerprint = model.fingerprint().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = Arc::clone(&model);
            std::thread::spawn(move || {
                let ctx = Context::from_arc(model);
                let dept = ctx.attach(department("D1")).unwrap();
                let emp = ctx.attach(employee("E1")).unwrap();
                ctx.add_to_collection(dept, "employees", emp).unwrap();
                ctx.collection(dept, "employees").unwrap().len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert_eq!(model.fingerprint().unwrap(), fingerprint);
}
