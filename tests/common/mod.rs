//! Shared fixtures: a unit of work over repository mocks plus sample rows.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};

use brewmaster::config::{Config, ROLE_ADMIN, ROLE_CAJERO};
use brewmaster::domain::{
    Actor, Barril, Caja, EstadoBarril, EstadoCaja, EstadoVenta, MetodoPago, Usuario, Venta,
    VentaDetalle,
};
use brewmaster::infra::repositories::{
    MockAuditoriaRepository, MockBarrilRepository, MockBodegaRepository, MockCajaRepository,
    MockDevolucionRepository, MockMovimientoRepository, MockRolRepository, MockUsuarioRepository,
    MockVentaRepository,
};
use brewmaster::infra::{
    AuditoriaRepository, BarrilRepository, BodegaRepository, CajaRepository, DevolucionRepository,
    MovimientoRepository, RolRepository, UnitOfWork, UsuarioRepository, VentaRepository,
};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

/// Test mock for UnitOfWork; repositories left unset have no expectations
/// and panic on any call.
pub struct TestUnitOfWork {
    usuarios: Arc<MockUsuarioRepository>,
    roles: Arc<MockRolRepository>,
    bodegas: Arc<MockBodegaRepository>,
    barriles: Arc<MockBarrilRepository>,
    movimientos: Arc<MockMovimientoRepository>,
    cajas: Arc<MockCajaRepository>,
    ventas: Arc<MockVentaRepository>,
    devoluciones: Arc<MockDevolucionRepository>,
    auditoria: Arc<MockAuditoriaRepository>,
}

impl TestUnitOfWork {
    pub fn new() -> Self {
        Self {
            usuarios: Arc::new(MockUsuarioRepository::new()),
            roles: Arc::new(MockRolRepository::new()),
            bodegas: Arc::new(MockBodegaRepository::new()),
            barriles: Arc::new(MockBarrilRepository::new()),
            movimientos: Arc::new(MockMovimientoRepository::new()),
            cajas: Arc::new(MockCajaRepository::new()),
            ventas: Arc::new(MockVentaRepository::new()),
            devoluciones: Arc::new(MockDevolucionRepository::new()),
            auditoria: Arc::new(MockAuditoriaRepository::new()),
        }
    }

    pub fn with_usuarios(mut self, repo: MockUsuarioRepository) -> Self {
        self.usuarios = Arc::new(repo);
        self
    }

    pub fn with_roles(mut self, repo: MockRolRepository) -> Self {
        self.roles = Arc::new(repo);
        self
    }

    pub fn with_barriles(mut self, repo: MockBarrilRepository) -> Self {
        self.barriles = Arc::new(repo);
        self
    }

    pub fn with_cajas(mut self, repo: MockCajaRepository) -> Self {
        self.cajas = Arc::new(repo);
        self
    }

    pub fn with_ventas(mut self, repo: MockVentaRepository) -> Self {
        self.ventas = Arc::new(repo);
        self
    }

    pub fn with_devoluciones(mut self, repo: MockDevolucionRepository) -> Self {
        self.devoluciones = Arc::new(repo);
        self
    }

    pub fn with_auditoria(mut self, repo: MockAuditoriaRepository) -> Self {
        self.auditoria = Arc::new(repo);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl UnitOfWork for TestUnitOfWork {
    fn usuarios(&self) -> Arc<dyn UsuarioRepository> {
        self.usuarios.clone()
    }

    fn roles(&self) -> Arc<dyn RolRepository> {
        self.roles.clone()
    }

    fn bodegas(&self) -> Arc<dyn BodegaRepository> {
        self.bodegas.clone()
    }

    fn barriles(&self) -> Arc<dyn BarrilRepository> {
        self.barriles.clone()
    }

    fn movimientos(&self) -> Arc<dyn MovimientoRepository> {
        self.movimientos.clone()
    }

    fn cajas(&self) -> Arc<dyn CajaRepository> {
        self.cajas.clone()
    }

    fn ventas(&self) -> Arc<dyn VentaRepository> {
        self.ventas.clone()
    }

    fn devoluciones(&self) -> Arc<dyn DevolucionRepository> {
        self.devoluciones.clone()
    }

    fn auditoria(&self) -> Arc<dyn AuditoriaRepository> {
        self.auditoria.clone()
    }
}

/// Config with a known secret and the cheapest bcrypt cost.
pub fn test_config() -> Config {
    let mut config = Config::with_secret(TEST_SECRET);
    config.bcrypt_cost = 4;
    config
}

pub fn admin(id: i32) -> Actor {
    Actor::new(id, ROLE_ADMIN)
}

pub fn cajero(id: i32) -> Actor {
    Actor::new(id, ROLE_CAJERO)
}

pub fn usuario(id: i32, rol: &str, password_hash: &str) -> Usuario {
    Usuario {
        id,
        rut: "12345678-5".to_string(),
        nombre: "Camila Rojas".to_string(),
        email: "camila@brewmaster.cl".to_string(),
        password_hash: password_hash.to_string(),
        rol_id: if rol == ROLE_ADMIN { 1 } else { 2 },
        rol: rol.to_string(),
        activo: true,
        creado_en: Utc::now(),
        actualizado_en: Utc::now(),
    }
}

pub fn caja_abierta(id: i32, usuario_id: i32, monto_inicial: i64) -> Caja {
    Caja {
        id,
        usuario_id,
        estado: EstadoCaja::Abierta,
        monto_inicial,
        monto_final: None,
        fecha_apertura: Utc::now() - Duration::hours(2),
        fecha_cierre: None,
    }
}

pub fn caja_cerrada(id: i32, usuario_id: i32, monto_inicial: i64) -> Caja {
    Caja {
        estado: EstadoCaja::Cerrada,
        fecha_cierre: Some(Utc::now() - Duration::minutes(30)),
        ..caja_abierta(id, usuario_id, monto_inicial)
    }
}

pub fn barril(id: i32, volumen: f64) -> Barril {
    Barril {
        id,
        codigo: format!("BRL-0000000{}", id),
        tipo_cerveza: "IPA".to_string(),
        capacidad_litros: 50.0,
        volumen_restante: volumen,
        estado: EstadoBarril::Disponible,
        bodega_id: Some(1),
        ubicacion: None,
        activo: true,
        creado_en: Utc::now(),
        actualizado_en: Utc::now(),
    }
}

/// Completed sale of `cantidad` pints at 4500 from barrel 1.
pub fn venta(id: i32, caja_id: i32, usuario_id: i32, metodo_pago: MetodoPago, cantidad: i32) -> Venta {
    let subtotal = 4500 * i64::from(cantidad);
    Venta {
        id,
        caja_id,
        usuario_id,
        metodo_pago,
        subtotal,
        descuento: 0,
        total: subtotal,
        estado: EstadoVenta::Completada,
        fecha: Utc::now() - Duration::minutes(45),
        detalles: vec![VentaDetalle {
            id: id * 10,
            venta_id: id,
            barril_id: Some(1),
            descripcion: "Schop IPA 500cc".to_string(),
            cantidad,
            precio_unitario: 4500,
            volumen_litros: 0.5,
            subtotal,
        }],
    }
}
